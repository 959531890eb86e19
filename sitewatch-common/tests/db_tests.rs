//! Tests for database initialization and the alert snapshot store

use chrono::{Duration, Utc};
use sitewatch_common::alert::{Alert, AlertSource, Severity};
use sitewatch_common::db::{alerts, init_database};

fn alert(id_suffix: &str, severity: Severity, age: Duration) -> Alert {
    let source = AlertSource::Risk {
        worker_id: id_suffix.to_string(),
    };
    Alert {
        id: source.id(),
        source,
        severity,
        label: "watch".to_string(),
        title: format!("Watch Risk: Worker {id_suffix}"),
        description: "Hours worked (10h) contributes 15 pts".to_string(),
        reasons: vec!["Hours worked (10h) contributes 15 pts".to_string()],
        recommended_actions: vec!["Add a short 15-minute rest and verify hydration.".to_string()],
        worker_id: Some(id_suffix.to_string()),
        risk_score: Some(45),
        site_location: Some("Building A - Zone 2".to_string()),
        arrived_at: Utc::now() - age,
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("sitewatch.db");

    assert!(!db_path.exists());
    let pool = init_database(&db_path).await.expect("init should succeed");
    assert!(db_path.exists());

    // Schema is queryable immediately
    let alerts = alerts::load_snapshot(&pool).await.expect("load");
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("sitewatch.db");

    let pool = init_database(&db_path).await.expect("first init");
    drop(pool);

    // Re-opening an existing database must not fail or reset data
    let pool = init_database(&db_path).await.expect("second init");
    alerts::replace_snapshot(&pool, &[alert("W-1", Severity::Medium, Duration::zero())])
        .await
        .expect("save");
    drop(pool);

    let pool = init_database(&db_path).await.expect("third init");
    let loaded = alerts::load_snapshot(&pool).await.expect("load");
    assert_eq!(loaded.len(), 1);
}

#[tokio::test]
async fn test_snapshot_round_trip_preserves_order_and_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = init_database(&dir.path().join("sitewatch.db"))
        .await
        .expect("init");

    let feed = vec![
        alert("W-3", Severity::High, Duration::zero()),
        alert("W-2", Severity::Medium, Duration::minutes(5)),
        alert("W-1", Severity::Low, Duration::minutes(10)),
    ];

    alerts::replace_snapshot(&pool, &feed).await.expect("save");
    let loaded = alerts::load_snapshot(&pool).await.expect("load");

    assert_eq!(loaded.len(), 3);
    // Order preserved: newest first, exactly as written
    assert_eq!(loaded[0].id, "risk-W-3");
    assert_eq!(loaded[1].id, "risk-W-2");
    assert_eq!(loaded[2].id, "risk-W-1");

    assert_eq!(loaded[0].severity, Severity::High);
    assert_eq!(loaded[0].risk_score, Some(45));
    assert_eq!(loaded[0].reasons.len(), 1);
    assert_eq!(loaded[0].site_location.as_deref(), Some("Building A - Zone 2"));
    assert_eq!(loaded[0].source.source_type(), "risk");
}

#[tokio::test]
async fn test_replace_snapshot_overwrites_previous() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = init_database(&dir.path().join("sitewatch.db"))
        .await
        .expect("init");

    alerts::replace_snapshot(
        &pool,
        &[
            alert("W-1", Severity::Low, Duration::zero()),
            alert("W-2", Severity::Low, Duration::zero()),
        ],
    )
    .await
    .expect("first save");

    alerts::replace_snapshot(&pool, &[alert("W-9", Severity::High, Duration::zero())])
        .await
        .expect("second save");

    let loaded = alerts::load_snapshot(&pool).await.expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "risk-W-9");
}

#[tokio::test]
async fn test_delete_older_than_is_strictly_older() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = init_database(&dir.path().join("sitewatch.db"))
        .await
        .expect("init");

    let fresh = alert("W-1", Severity::Low, Duration::hours(1));
    let stale = alert("W-2", Severity::Low, Duration::hours(30));
    let boundary = alert("W-3", Severity::Low, Duration::zero());

    alerts::replace_snapshot(&pool, &[fresh.clone(), stale, boundary.clone()])
        .await
        .expect("save");

    // Cutoff exactly at the boundary entry's arrival: boundary is retained
    let removed = alerts::delete_older_than(&pool, boundary.arrived_at)
        .await
        .expect("delete");
    assert_eq!(removed, 2);

    let loaded = alerts::load_snapshot(&pool).await.expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "risk-W-3");
}
