//! Alert snapshot store
//!
//! Persists the full ordered feed (`replace_snapshot`) and reloads it
//! (`load_snapshot`) so late-joining processes and restarts can reconcile
//! against the last known feed state. Rows that fail to decode are skipped
//! with a warning rather than failing the whole load.

use crate::alert::{Alert, AlertSource, Severity};
use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Replace the persisted snapshot with the given feed contents
///
/// Runs in a single transaction so readers in other processes observe
/// either the old or the new snapshot, never a partial one.
pub async fn replace_snapshot(pool: &SqlitePool, alerts: &[Alert]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM alerts").execute(&mut *tx).await?;

    for (position, alert) in alerts.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO alerts (
                id, source_kind, source_id, severity, label, title, description,
                reasons, recommended_actions, worker_id, risk_score,
                site_location, arrived_at_ms, position
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.id)
        .bind(alert.source.source_type())
        .bind(alert.source.source_id())
        .bind(alert.severity.to_string())
        .bind(&alert.label)
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(serde_json::to_string(&alert.reasons)?)
        .bind(serde_json::to_string(&alert.recommended_actions)?)
        .bind(&alert.worker_id)
        .bind(alert.risk_score.map(|s| s as i64))
        .bind(&alert.site_location)
        .bind(alert.arrived_at.timestamp_millis())
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Persisted alert snapshot ({} entries)", alerts.len());
    Ok(())
}

/// Load the persisted snapshot, newest first
pub async fn load_snapshot(pool: &SqlitePool) -> Result<Vec<Alert>> {
    type AlertRow = (
        String,         // id
        String,         // source_kind
        String,         // source_id
        String,         // severity
        String,         // label
        String,         // title
        String,         // description
        String,         // reasons (JSON)
        String,         // recommended_actions (JSON)
        Option<String>, // worker_id
        Option<i64>,    // risk_score
        Option<String>, // site_location
        i64,            // arrived_at_ms
    );

    let rows = sqlx::query_as::<_, AlertRow>(
        r#"
        SELECT id, source_kind, source_id, severity, label, title, description,
               reasons, recommended_actions, worker_id, risk_score,
               site_location, arrived_at_ms
        FROM alerts
        ORDER BY position ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut alerts = Vec::with_capacity(rows.len());
    for row in rows {
        match decode_row(row) {
            Some(alert) => alerts.push(alert),
            None => warn!("Skipping undecodable alert row in snapshot"),
        }
    }

    debug!("Loaded alert snapshot ({} entries)", alerts.len());
    Ok(alerts)
}

/// Delete persisted alerts strictly older than the cutoff
///
/// Returns the number of rows removed.
pub async fn delete_older_than(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM alerts WHERE arrived_at_ms < ?")
        .bind(cutoff.timestamp_millis())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[allow(clippy::type_complexity)]
fn decode_row(
    (
        id,
        source_kind,
        source_id,
        severity,
        label,
        title,
        description,
        reasons,
        recommended_actions,
        worker_id,
        risk_score,
        site_location,
        arrived_at_ms,
    ): (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        Option<String>,
        Option<i64>,
        Option<String>,
        i64,
    ),
) -> Option<Alert> {
    let source = match source_kind.as_str() {
        "risk" => AlertSource::Risk {
            worker_id: source_id,
        },
        "violation" => AlertSource::Violation {
            batch_id: source_id,
        },
        _ => return None,
    };

    let severity = match severity.as_str() {
        "high" => Severity::High,
        "medium" => Severity::Medium,
        "low" => Severity::Low,
        _ => return None,
    };

    Some(Alert {
        id,
        source,
        severity,
        label,
        title,
        description,
        reasons: serde_json::from_str(&reasons).ok()?,
        recommended_actions: serde_json::from_str(&recommended_actions).ok()?,
        worker_id,
        risk_score: risk_score.map(|s| s.clamp(0, 100) as u8),
        site_location,
        arrived_at: DateTime::from_timestamp_millis(arrived_at_ms)?,
    })
}
