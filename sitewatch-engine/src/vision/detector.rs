//! Detector service client
//!
//! Thin HTTP client for the external PPE inference service. The detector is
//! best-effort from the engine's point of view: unreachability, error
//! statuses, and undecodable responses all degrade to "no detections" with
//! a logged warning, matching how an empty image is treated.

use crate::vision::types::Detection;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Response shape of the inference service's /predict endpoint
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    #[allow(dead_code)]
    time_ms: u64,
    #[serde(default)]
    count: usize,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// HTTP client for the object-detection service
#[derive(Debug, Clone)]
pub struct DetectorClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run detection on one image, degrading to an empty list on any failure
    pub async fn detect(&self, file_name: &str, bytes: Vec<u8>) -> Vec<Detection> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .timeout(PREDICT_TIMEOUT)
            .multipart(form)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("Detector unreachable for '{}': {}", file_name, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Detector returned {} for '{}'",
                response.status(),
                file_name
            );
            return Vec::new();
        }

        match response.json::<PredictResponse>().await {
            Ok(parsed) => {
                debug!(
                    "Detector found {} object(s) in '{}'",
                    parsed.count, file_name
                );
                parsed.detections
            }
            Err(e) => {
                warn!("Undecodable detector response for '{}': {}", file_name, e);
                Vec::new()
            }
        }
    }

    /// Probe the detector's health endpoint
    pub async fn is_healthy(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
