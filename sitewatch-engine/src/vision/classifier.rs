//! Detection classifier
//!
//! Checks detector output against the fixed missing-PPE vocabulary. An
//! empty detection list (detector idle, unreachable, or genuinely nothing
//! found) is a compliant assessment, never an error.

use crate::error::{Error, Result};
use crate::vision::types::{AssetDetections, Detection, FileViolations, ViolationAssessment};
use chrono::Utc;
use tracing::debug;

/// Fixed vocabulary of violating detection classes
pub const VIOLATION_CLASSES: [&str; 5] =
    ["no_helmet", "no_vest", "no_glove", "no_mask", "no_shoes"];

/// Stateless classifier for detector output
///
/// Carries only a minimum-confidence floor; detections below it are
/// ignored. The default floor of 0.0 trusts the detector's own threshold.
#[derive(Debug, Clone)]
pub struct DetectionClassifier {
    min_confidence: f64,
}

impl DetectionClassifier {
    pub fn new() -> Self {
        Self {
            min_confidence: 0.0,
        }
    }

    pub fn with_min_confidence(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Classify a single asset's detections
    pub fn classify(
        &self,
        asset_id: &str,
        site_location: Option<&str>,
        detections: &[Detection],
    ) -> Result<ViolationAssessment> {
        let file = AssetDetections {
            name: asset_id.to_string(),
            detections: detections.to_vec(),
        };
        self.classify_batch(asset_id, site_location, &[file])
    }

    /// Classify a batch of assets, aggregating per-file violation sets
    ///
    /// The union across the batch is available via
    /// [`ViolationAssessment::violating_classes`].
    pub fn classify_batch(
        &self,
        batch_id: &str,
        site_location: Option<&str>,
        files: &[AssetDetections],
    ) -> Result<ViolationAssessment> {
        if batch_id.trim().is_empty() {
            return Err(Error::InvalidInput("asset id is required".to_string()));
        }

        let mut violations = Vec::new();
        for file in files {
            let violating = self.violating_in(&file.detections);
            if !violating.is_empty() {
                violations.push(FileViolations {
                    file_name: file.name.clone(),
                    violating,
                });
            }
        }

        debug!(
            "classified batch {}: {} file(s), {} with violations",
            batch_id,
            files.len(),
            violations.len()
        );

        Ok(ViolationAssessment {
            batch_id: batch_id.to_string(),
            site_location: site_location.map(|s| s.to_string()),
            checked_files: files.len(),
            violations,
            computed_at: Utc::now(),
        })
    }

    /// Distinct violating class labels in one detection list, first-seen order
    fn violating_in(&self, detections: &[Detection]) -> Vec<String> {
        let mut violating: Vec<String> = Vec::new();
        for detection in detections {
            if detection.confidence < self.min_confidence {
                continue;
            }
            if VIOLATION_CLASSES.contains(&detection.class_name.as_str())
                && !violating.contains(&detection.class_name)
            {
                violating.push(detection.class_name.clone());
            }
        }
        violating
    }
}

impl Default for DetectionClassifier {
    fn default() -> Self {
        Self::new()
    }
}
