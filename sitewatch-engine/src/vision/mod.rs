//! PPE detection classification
//!
//! Consumes object-detection output (an opaque external detector returning
//! labeled boxes per image) and assesses assets for missing-PPE violations.
//! Pure and stateless apart from the HTTP detector client.

pub mod classifier;
pub mod detector;
pub mod types;

pub use classifier::{DetectionClassifier, VIOLATION_CLASSES};
pub use detector::DetectorClient;
pub use types::{AssetDetections, Detection, FileViolations, ViolationAssessment};
