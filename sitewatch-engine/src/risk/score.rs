//! Risk score calculation
//!
//! Converts a worker snapshot into a 0-100 risk score and alert level.
//! Additive components (age, hours, rest, vitals) build a raw score; a
//! health multiplier scales it. The raw sum stays fractional and rounding
//! happens exactly once, on the multiplied result (half away from zero).
//!
//! Missing optional inputs never fail scoring: rest defaults to a full 8h,
//! absent vitals contribute no points. The only hard error is a missing
//! worker id, which the caller must treat as a rejected submission.

use crate::error::{Error, Result};
use crate::risk::types::{RiskAssessment, Vitals, WorkerSnapshot};
use chrono::Utc;
use sitewatch_common::AlertLevel;
use tracing::debug;

/// Neutral rest default when the snapshot omits rest minutes (8 hours)
pub const DEFAULT_REST_MINUTES: f64 = 480.0;

/// Sentinel condition label meaning "no conditions"
const NO_CONDITION: &str = "None";

/// Compute a risk assessment for one worker snapshot
pub fn score(snapshot: &WorkerSnapshot) -> Result<RiskAssessment> {
    if snapshot.worker_id.trim().is_empty() {
        return Err(Error::InvalidInput("worker id is required".to_string()));
    }

    let age = snapshot.age;
    let hours = snapshot.total_hours_worked;
    let rest = snapshot.rest_minutes.unwrap_or(DEFAULT_REST_MINUTES);

    let age_pts = age_component(age);
    let hours_pts = hours_component(hours);
    let rest_pts = rest_component(rest);
    let (vitals_pts, vital_flags) = vitals_component(snapshot.vitals.as_ref());

    let raw = (age_pts + hours_pts + rest_pts + vitals_pts).clamp(0.0, 100.0);
    let multiplier = health_multiplier(&snapshot.health_conditions, &snapshot.medications);
    let score = (raw * multiplier).round().clamp(0.0, 100.0) as u8;
    let alert_level = AlertLevel::from_score(score);

    let mut reasons = Vec::new();
    if age_pts > 0.0 {
        reasons.push(format!("Age ({}) contributes {} pts", age, age_pts.round()));
    }
    if hours_pts > 0.0 {
        reasons.push(format!(
            "Hours worked ({}h) contributes {} pts",
            hours,
            hours_pts.round()
        ));
    }
    if rest_pts > 0.0 {
        reasons.push(format!(
            "Insufficient rest ({} min in last 24h) contributes {} pts",
            rest,
            rest_pts.round()
        ));
    }
    if vitals_pts > 0.0 {
        reasons.push(format!(
            "Abnormal vitals ({}) contribute {} pts",
            vital_flags.join(", "),
            vitals_pts.round()
        ));
    }

    let condition_count = condition_count(&snapshot.health_conditions);
    if condition_count > 0 {
        reasons.push(format!(
            "{} health condition(s) apply multiplier x{:.2}",
            condition_count, multiplier
        ));
    } else {
        reasons.push("No health conditions - multiplier x1.00".to_string());
    }

    if !snapshot.medications.trim().is_empty() {
        reasons.push("Medications present - added caution".to_string());
    }

    debug!(
        "scored worker {}: raw {:.2} x{:.2} -> {} ({})",
        snapshot.worker_id, raw, multiplier, score, alert_level
    );

    Ok(RiskAssessment {
        worker_id: snapshot.worker_id.clone(),
        worker_name: snapshot.worker_name.clone(),
        score,
        alert_level,
        reasons,
        recommended_actions: recommended_actions(alert_level),
        site_location: snapshot.site_location.clone(),
        supervisor_name: snapshot.supervisor_name.clone(),
        computed_at: Utc::now(),
    })
}

/// Age component (0-30 pts): 0 at or below 30 years, linear ramp to 30
/// points at 70, clamped above
fn age_component(age: f64) -> f64 {
    ((age - 30.0) / (70.0 - 30.0) * 30.0).clamp(0.0, 30.0)
}

/// Hours component (0-30 pts): 0 below 8h, linear ramp to 30 points at 12h
fn hours_component(hours: f64) -> f64 {
    ((hours - 8.0) / (12.0 - 8.0) * 30.0).clamp(0.0, 30.0)
}

/// Rest component (0-20 pts): stepped on rest minutes in the last 24h
fn rest_component(rest_minutes: f64) -> f64 {
    if rest_minutes < 360.0 {
        20.0
    } else if rest_minutes < 480.0 {
        10.0
    } else {
        0.0
    }
}

/// Vitals component (0-20 pts): additive per abnormal reading, then
/// clamped. Returns the points and the flags that fired, for reasons.
fn vitals_component(vitals: Option<&Vitals>) -> (f64, Vec<String>) {
    let Some(vitals) = vitals else {
        return (0.0, Vec::new());
    };

    let mut points: f64 = 0.0;
    let mut flags = Vec::new();

    if let Some(hr) = vitals.heart_rate_bpm {
        if hr > 120.0 {
            points += 15.0;
            flags.push(format!("heart rate {} bpm", hr));
        } else if hr > 100.0 {
            points += 10.0;
            flags.push(format!("heart rate {} bpm", hr));
        }
    }

    if let Some(temp) = vitals.temperature_c {
        if temp > 38.5 {
            points += 12.0;
            flags.push(format!("temperature {:.1}C", temp));
        } else if temp > 37.5 {
            points += 7.0;
            flags.push(format!("temperature {:.1}C", temp));
        }
    }

    let systolic = vitals.systolic_bp.unwrap_or(0.0);
    let diastolic = vitals.diastolic_bp.unwrap_or(0.0);
    if systolic > 160.0 || diastolic > 100.0 {
        points += 12.0;
        flags.push(format!("blood pressure {}/{}", systolic, diastolic));
    } else if systolic > 140.0 || diastolic > 90.0 {
        points += 8.0;
        flags.push(format!("blood pressure {}/{}", systolic, diastolic));
    }

    (points.clamp(0.0, 20.0), flags)
}

/// Health multiplier from conditions and medications
///
/// Every condition adds +0.2; medications add a small caution (+0.1);
/// capped so the multiplier stays between 1.0 and 1.6. The "None" sentinel
/// does not count as a condition.
fn health_multiplier(conditions: &[String], medications: &str) -> f64 {
    let count = condition_count(conditions);
    if count == 0 {
        return 1.0;
    }

    let mut multiplier = 1.0 + 0.2 * count as f64;
    if !medications.trim().is_empty() {
        multiplier += 0.1;
    }
    multiplier.clamp(1.0, 1.6)
}

fn condition_count(conditions: &[String]) -> usize {
    conditions.iter().filter(|c| c.as_str() != NO_CONDITION).count()
}

/// Recommended actions per alert level
fn recommended_actions(level: AlertLevel) -> Vec<String> {
    let actions: &[&str] = match level {
        AlertLevel::Ok => &["Maintain hydration and standard rest schedule."],
        AlertLevel::Watch => &[
            "Add a short 15-minute rest and verify hydration.",
            "Supervisor: brief check-in at shift end.",
        ],
        AlertLevel::Warning => &[
            "Require 30-minute rest and reduced physical tasks.",
            "Supervisor to adjust next shift workload.",
        ],
        AlertLevel::Critical => &[
            "Stop work immediately and initiate medical check.",
            "Notify supervisor and emergency contact.",
        ],
    };
    actions.iter().map(|s| s.to_string()).collect()
}
