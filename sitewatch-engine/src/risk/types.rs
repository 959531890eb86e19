//! Worker snapshot and risk assessment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sitewatch_common::AlertLevel;

/// Ephemeral, input-only view of a worker's current shift and health state
///
/// Produced by the caller (form submission, import job) and not persisted
/// by the engine. Numeric fields use lenient parsing: JSON numbers or
/// numeric strings are accepted, unparseable strings coerce to 0. Missing
/// optional fields take neutral defaults at scoring time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSnapshot {
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub worker_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub age: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_hours_worked: f64,
    /// Rest minutes in the last 24h; missing defaults to 480 (8h) at scoring
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub rest_minutes: Option<f64>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub vitals: Option<Vitals>,
    #[serde(default)]
    pub site_location: String,
    #[serde(default)]
    pub supervisor_name: String,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Optional vital-sign readings; absent values contribute no risk points
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub heart_rate_bpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub temperature_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub systolic_bp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub diastolic_bp: Option<f64>,
}

/// Result of scoring one worker snapshot; immutable once computed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub worker_id: String,
    pub worker_name: String,
    /// Combined fatigue/health exposure, 0-100
    pub score: u8,
    pub alert_level: AlertLevel,
    pub reasons: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub site_location: String,
    pub supervisor_name: String,
    pub computed_at: DateTime<Utc>,
}

/// Lenient numeric field: number, numeric string, or null
///
/// Invalid strings coerce to 0 rather than rejecting the submission; this
/// is a documented parsing policy, not a validation layer.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_number(value).unwrap_or(0.0))
}

/// Lenient optional numeric field: missing/null stays `None` so scoring can
/// apply its own defaulting rule
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        other => Ok(Some(coerce_number(other).unwrap_or(0.0))),
    }
}

fn coerce_number(value: Option<serde_json::Value>) -> Option<f64> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => Some(s.trim().parse().unwrap_or(0.0)),
        _ => None,
    }
}
