//! Worker risk scoring
//!
//! Pure, stateless computation: a worker snapshot in, a risk assessment
//! out. Safe to call concurrently from any number of producer tasks.

pub mod score;
pub mod types;

pub use score::score;
pub use types::{RiskAssessment, Vitals, WorkerSnapshot};
