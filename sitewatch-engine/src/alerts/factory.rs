//! Alert factory
//!
//! Normalizes a risk or violation assessment into a canonical [`Alert`]
//! with deterministic templating. The produced id is a pure function of the
//! alert's source, so repeated calls for the same worker or batch are
//! idempotent at the identity level and upsert in the feed.

use crate::risk::RiskAssessment;
use crate::vision::ViolationAssessment;
use sitewatch_common::{Alert, AlertLevel, AlertSource, Severity};

/// Build an alert from a worker risk assessment
pub fn from_risk(assessment: &RiskAssessment) -> Alert {
    let source = AlertSource::Risk {
        worker_id: assessment.worker_id.clone(),
    };

    let description = if assessment.reasons.is_empty() {
        format!("Risk score: {}/100", assessment.score)
    } else {
        assessment.reasons.join("; ")
    };

    let severity = match assessment.alert_level {
        AlertLevel::Critical | AlertLevel::Warning => Severity::High,
        AlertLevel::Watch => Severity::Medium,
        AlertLevel::Ok => Severity::Low,
    };

    Alert {
        id: source.id(),
        source,
        severity,
        label: assessment.alert_level.as_str().to_string(),
        title: format!(
            "{} Risk: {}",
            level_title(assessment.alert_level),
            assessment.worker_name
        ),
        description,
        reasons: assessment.reasons.clone(),
        recommended_actions: assessment.recommended_actions.clone(),
        worker_id: Some(assessment.worker_id.clone()),
        risk_score: Some(assessment.score),
        site_location: non_empty(&assessment.site_location),
        arrived_at: assessment.computed_at,
    }
}

/// Build an alert from a PPE violation assessment
pub fn from_violation(assessment: &ViolationAssessment) -> Alert {
    let source = AlertSource::Violation {
        batch_id: assessment.batch_id.clone(),
    };

    let compliant = assessment.is_compliant();

    let reasons: Vec<String> = assessment
        .violations
        .iter()
        .map(|file| format!("File '{}' → {}", file.file_name, file.violating.join(", ")))
        .collect();

    let description = if compliant {
        format!("Checked {} image(s). All PPE OK.", assessment.checked_files)
    } else {
        reasons.join(" | ")
    };

    Alert {
        id: source.id(),
        source,
        severity: if compliant { Severity::Low } else { Severity::High },
        label: if compliant { "clear" } else { "violation" }.to_string(),
        title: if compliant { "All Clear" } else { "Safety Violation" }.to_string(),
        description,
        reasons,
        recommended_actions: Vec::new(),
        worker_id: None,
        risk_score: None,
        site_location: assessment.site_location.clone(),
        arrived_at: assessment.computed_at,
    }
}

fn level_title(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Ok => "OK",
        AlertLevel::Watch => "Watch",
        AlertLevel::Warning => "Warning",
        AlertLevel::Critical => "Critical",
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{Detection, DetectionClassifier};
    use chrono::Utc;

    fn assessment(score: u8, reasons: Vec<String>) -> RiskAssessment {
        RiskAssessment {
            worker_id: "W-42".to_string(),
            worker_name: "Maria Santos".to_string(),
            score,
            alert_level: AlertLevel::from_score(score),
            reasons,
            recommended_actions: vec!["Stop work immediately and initiate medical check.".to_string()],
            site_location: "Tower B".to_string(),
            supervisor_name: "J. Oduya".to_string(),
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_risk_alert_titles_on_level_and_name() {
        let alert = from_risk(&assessment(92, vec!["line".to_string()]));
        assert_eq!(alert.title, "Critical Risk: Maria Santos");
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.label, "critical");
        assert_eq!(alert.id, "risk-W-42");
        assert_eq!(alert.risk_score, Some(92));
        assert_eq!(alert.site_location.as_deref(), Some("Tower B"));
    }

    #[test]
    fn test_risk_description_falls_back_to_score() {
        let alert = from_risk(&assessment(45, Vec::new()));
        assert_eq!(alert.description, "Risk score: 45/100");
        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(alert.label, "watch");
    }

    #[test]
    fn test_risk_description_joins_reasons() {
        let alert = from_risk(&assessment(
            25,
            vec!["first".to_string(), "second".to_string()],
        ));
        assert_eq!(alert.description, "first; second");
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.title, "OK Risk: Maria Santos");
    }

    #[test]
    fn test_severity_mapping_per_level() {
        assert_eq!(from_risk(&assessment(10, vec![])).severity, Severity::Low);
        assert_eq!(from_risk(&assessment(50, vec![])).severity, Severity::Medium);
        assert_eq!(from_risk(&assessment(70, vec![])).severity, Severity::High);
        assert_eq!(from_risk(&assessment(95, vec![])).severity, Severity::High);
    }

    #[test]
    fn test_violation_alert_from_detections() {
        let classifier = DetectionClassifier::new();
        let assessment = classifier
            .classify(
                "img1",
                Some("Excavation Site - North"),
                &[
                    Detection::new("no_helmet", 0.9),
                    Detection::new("no_vest", 0.8),
                ],
            )
            .expect("classify");

        let alert = from_violation(&assessment);
        assert_eq!(alert.title, "Safety Violation");
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.label, "violation");
        assert_eq!(alert.id, "ppe-img1");
        assert_eq!(alert.description, "File 'img1' → no_helmet, no_vest");
        assert!(alert.worker_id.is_none());
    }

    #[test]
    fn test_compliant_alert_is_all_clear() {
        let classifier = DetectionClassifier::new();
        let assessment = classifier.classify("img2", None, &[]).expect("classify");

        let alert = from_violation(&assessment);
        assert_eq!(alert.title, "All Clear");
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.label, "clear");
        assert_eq!(alert.description, "Checked 1 image(s). All PPE OK.");
        assert!(alert.reasons.is_empty());
    }

    #[test]
    fn test_factory_is_idempotent_at_identity_level() {
        let first = from_risk(&assessment(45, vec!["a".to_string()]));
        let second = from_risk(&assessment(88, vec!["b".to_string()]));
        // Content differs, identity does not
        assert_eq!(first.id, second.id);
        assert_ne!(first.description, second.description);
    }
}
