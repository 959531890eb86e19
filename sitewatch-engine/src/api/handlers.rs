//! HTTP request handlers
//!
//! Implements the REST endpoints over the scoring, classification, and
//! feed components. Handlers validate identity fields, drop malformed
//! batch items with a warning, and never surface feed invariants as
//! errors.

use crate::alerts::factory;
use crate::alerts::feed::DEFAULT_PURGE_HORIZON_HOURS;
use crate::risk::{self, WorkerSnapshot};
use crate::state::AppContext;
use crate::vision::AssetDetections;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sitewatch_common::{Alert, AlertLevel};
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    detector_reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitWorkerResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_level: Option<AlertLevel>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBatchRequest {
    #[serde(default)]
    batch_id: Option<String>,
    #[serde(default)]
    site_location: Option<String>,
    #[serde(default)]
    assets: Vec<AssetRef>,
}

/// A stored file handed to the engine by the upload subsystem
#[derive(Debug, Deserialize)]
pub struct AssetRef {
    name: String,
    path: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeBatchResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    checked_files: usize,
    violating_classes: Vec<String>,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    alerts: Vec<Alert>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeRequest {
    #[serde(default)]
    horizon_hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    removed: usize,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "alert_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        detector_reachable: ctx.detector.is_healthy().await,
    })
}

// ============================================================================
// Alert Producers
// ============================================================================

/// POST /workers - Score a worker snapshot and ingest the risk alert
pub async fn submit_worker(
    State(ctx): State<AppContext>,
    Json(snapshot): Json<WorkerSnapshot>,
) -> (StatusCode, Json<SubmitWorkerResponse>) {
    match risk::score(&snapshot) {
        Ok(assessment) => {
            let alert = factory::from_risk(&assessment);
            let id = alert.id.clone();
            info!(
                "Worker {} scored {} ({})",
                assessment.worker_id, assessment.score, assessment.alert_level
            );
            ctx.feed.ingest(alert).await;

            (
                StatusCode::OK,
                Json(SubmitWorkerResponse {
                    success: true,
                    id: Some(id),
                    score: Some(assessment.score),
                    alert_level: Some(assessment.alert_level),
                    message: "Worker risk assessment recorded".to_string(),
                }),
            )
        }
        Err(e) => {
            warn!("Rejected worker submission: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(SubmitWorkerResponse {
                    success: false,
                    id: None,
                    score: None,
                    alert_level: None,
                    message: e.to_string(),
                }),
            )
        }
    }
}

/// POST /batches - Run detection over a stored upload batch and ingest the
/// violation alert
///
/// Unreadable files are dropped with a warning and do not abort the batch;
/// detector unavailability yields a compliant assessment per asset.
pub async fn analyze_batch(
    State(ctx): State<AppContext>,
    Json(request): Json<AnalyzeBatchRequest>,
) -> (StatusCode, Json<AnalyzeBatchResponse>) {
    if request.assets.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AnalyzeBatchResponse {
                success: false,
                id: None,
                checked_files: 0,
                violating_classes: Vec::new(),
                message: "No files in batch".to_string(),
            }),
        );
    }

    let batch_id = request
        .batch_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("upload-{}", Uuid::new_v4()));

    let detections = futures::future::join_all(request.assets.iter().map(|asset| {
        let detector = ctx.detector.clone();
        async move {
            match tokio::fs::read(&asset.path).await {
                Ok(bytes) => Some(AssetDetections {
                    name: asset.name.clone(),
                    detections: detector.detect(&asset.name, bytes).await,
                }),
                Err(e) => {
                    warn!("Skipping unreadable asset '{}': {}", asset.path, e);
                    None
                }
            }
        }
    }))
    .await;
    let files: Vec<AssetDetections> = detections.into_iter().flatten().collect();

    match ctx
        .classifier
        .classify_batch(&batch_id, request.site_location.as_deref(), &files)
    {
        Ok(assessment) => {
            let violating = assessment.violating_classes();
            if !violating.is_empty() {
                warn!(
                    "Safety violation detected in batch {}: {}",
                    batch_id,
                    violating.join(", ")
                );
            }

            let alert = factory::from_violation(&assessment);
            let id = alert.id.clone();
            ctx.feed.ingest(alert).await;

            (
                StatusCode::OK,
                Json(AnalyzeBatchResponse {
                    success: true,
                    id: Some(id),
                    checked_files: assessment.checked_files,
                    violating_classes: violating,
                    message: "Batch analyzed".to_string(),
                }),
            )
        }
        Err(e) => {
            warn!("Rejected batch submission: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(AnalyzeBatchResponse {
                    success: false,
                    id: None,
                    checked_files: 0,
                    violating_classes: Vec::new(),
                    message: e.to_string(),
                }),
            )
        }
    }
}

// ============================================================================
// Feed Reads and Reconciliation
// ============================================================================

/// GET /alerts - Current ordered feed snapshot
pub async fn get_alerts(State(ctx): State<AppContext>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: ctx.feed.list().await,
    })
}

/// POST /alerts/purge - Remove alerts older than the horizon
///
/// Purge cadence belongs to the caller; the engine never runs timers.
pub async fn purge_alerts(
    State(ctx): State<AppContext>,
    request: Option<Json<PurgeRequest>>,
) -> Json<PurgeResponse> {
    let horizon_hours = request
        .and_then(|Json(r)| r.horizon_hours)
        .unwrap_or(DEFAULT_PURGE_HORIZON_HOURS);

    let removed = ctx
        .feed
        .purge_stale(chrono::Duration::hours(horizon_hours))
        .await;

    Json(PurgeResponse { removed })
}
