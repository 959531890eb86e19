//! Detection and violation assessment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One detected object in an image, as returned by the detector service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub class_id: i64,
    pub class_name: String,
    pub confidence: f64,
    /// Bounding box as [x1, y1, x2, y2] pixel coordinates
    #[serde(default)]
    pub box_xyxy: [f64; 4],
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            class_id: 0,
            class_name: class_name.into(),
            confidence,
            box_xyxy: [0.0; 4],
        }
    }
}

/// Detections for a single asset within a batch
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDetections {
    pub name: String,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Distinct violating class labels found in one file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileViolations {
    pub file_name: String,
    pub violating: Vec<String>,
}

/// Result of checking one asset or upload batch against the PPE violation
/// vocabulary; immutable once computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationAssessment {
    pub batch_id: String,
    pub site_location: Option<String>,
    /// Number of assets that were checked (including compliant ones)
    pub checked_files: usize,
    /// Per-file violation sets; only files with at least one violation
    pub violations: Vec<FileViolations>,
    pub computed_at: DateTime<Utc>,
}

impl ViolationAssessment {
    /// Union of violating classes across the batch, first-seen order
    pub fn violating_classes(&self) -> Vec<String> {
        let mut union: Vec<String> = Vec::new();
        for file in &self.violations {
            for class in &file.violating {
                if !union.contains(class) {
                    union.push(class.clone());
                }
            }
        }
        union
    }

    /// True when no checked file contained a violation
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}
