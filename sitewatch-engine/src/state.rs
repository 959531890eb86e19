//! Shared application context
//!
//! Cloneable context handed to all HTTP handlers. The feed is the only
//! shared mutable resource; scoring and classification are pure and carry
//! no state beyond configuration.

use crate::alerts::AlertFeed;
use crate::vision::{DetectionClassifier, DetectorClient};
use std::sync::Arc;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub feed: Arc<AlertFeed>,
    pub detector: Arc<DetectorClient>,
    pub classifier: Arc<DetectionClassifier>,
}
