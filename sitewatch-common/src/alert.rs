//! Canonical alert model shared by all SiteWatch services
//!
//! An [`Alert`] is the unified, displayable record produced from either a
//! worker risk assessment or a PPE violation assessment. Alerts are held in
//! the engine's bounded feed, pushed to subscribers over SSE, and persisted
//! as a best-effort snapshot for latecomers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display severity of an alert in the live feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Ordinal classification of a worker risk score
///
/// Variant order matters: levels compare by escalation (`Ok < Watch <
/// Warning < Critical`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    Watch,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Map a risk score (0-100) to its alert level
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => AlertLevel::Ok,
            31..=60 => AlertLevel::Watch,
            61..=80 => AlertLevel::Warning,
            _ => AlertLevel::Critical,
        }
    }

    /// Lowercase level name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Ok => "ok",
            AlertLevel::Watch => "watch",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of an alert: the assessment kind plus the identity of the thing
/// that was assessed
///
/// The alert id is a pure function of this source, so re-assessing the same
/// worker or batch produces the same id and upserts instead of duplicating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AlertSource {
    /// Worker risk assessment
    Risk { worker_id: String },
    /// PPE violation assessment for an asset or upload batch
    Violation { batch_id: String },
}

impl AlertSource {
    /// Deterministic feed identity derived from (source type, source id)
    pub fn id(&self) -> String {
        match self {
            AlertSource::Risk { worker_id } => format!("risk-{worker_id}"),
            AlertSource::Violation { batch_id } => format!("ppe-{batch_id}"),
        }
    }

    pub fn source_type(&self) -> &'static str {
        match self {
            AlertSource::Risk { .. } => "risk",
            AlertSource::Violation { .. } => "violation",
        }
    }

    pub fn source_id(&self) -> &str {
        match self {
            AlertSource::Risk { worker_id } => worker_id,
            AlertSource::Violation { batch_id } => batch_id,
        }
    }
}

/// A single entry in the live alert feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Stable identity, derived from the source (see [`AlertSource::id`])
    pub id: String,
    pub source: AlertSource,
    pub severity: Severity,
    /// Finer-grained origin label: the alert level name for risk alerts,
    /// "violation"/"clear" for PPE alerts
    pub label: String,
    pub title: String,
    pub description: String,
    pub reasons: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub worker_id: Option<String>,
    pub risk_score: Option<u8>,
    pub site_location: Option<String>,
    /// When the alert (last) arrived in the feed; stamped at ingestion
    pub arrived_at: DateTime<Utc>,
}
