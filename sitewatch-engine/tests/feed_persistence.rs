//! Feed persistence and reconciliation tests
//!
//! Exercise the write-behind snapshot store end to end: ingest through the
//! factory, flush, and reconcile a fresh feed from the same database.

use sitewatch_common::db::{alerts as alert_store, init_database};
use sitewatch_common::events::EventBus;
use sitewatch_engine::alerts::{factory, AlertFeed};
use sitewatch_engine::risk::{self, WorkerSnapshot};
use sitewatch_engine::vision::{Detection, DetectionClassifier};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = init_database(&dir.path().join("sitewatch.db"))
        .await
        .expect("init database");
    (dir, pool)
}

fn risk_alert(worker_id: &str, hours: f64) -> sitewatch_common::Alert {
    let snapshot = WorkerSnapshot {
        worker_id: worker_id.to_string(),
        worker_name: format!("Worker {worker_id}"),
        age: 45.0,
        total_hours_worked: hours,
        rest_minutes: Some(480.0),
        site_location: "Building A".to_string(),
        ..Default::default()
    };
    factory::from_risk(&risk::score(&snapshot).expect("score"))
}

#[tokio::test]
async fn test_flush_and_reload_reconciles() {
    let (_dir, pool) = test_pool().await;

    let feed = AlertFeed::with_store(50, EventBus::new(100), pool.clone());
    feed.ingest(risk_alert("W-1", 9.0)).await;
    feed.ingest(risk_alert("W-2", 11.0)).await;

    let classifier = DetectionClassifier::new();
    let assessment = classifier
        .classify("img1", Some("Zone A"), &[Detection::new("no_helmet", 0.9)])
        .expect("classify");
    feed.ingest(factory::from_violation(&assessment)).await;

    feed.flush().await.expect("flush");

    // A second feed over the same store sees the authoritative state
    let latecomer = AlertFeed::with_store(50, EventBus::new(100), pool);
    let restored = latecomer.load().await.expect("load");
    assert_eq!(restored, 3);

    let alerts = latecomer.list().await;
    assert_eq!(alerts[0].id, "ppe-img1");
    assert_eq!(alerts[1].id, "risk-W-2");
    assert_eq!(alerts[2].id, "risk-W-1");
    assert_eq!(alerts[0].title, "Safety Violation");
}

#[tokio::test]
async fn test_write_behind_persists_without_flush() {
    let (_dir, pool) = test_pool().await;

    let feed = AlertFeed::with_store(50, EventBus::new(100), pool.clone());
    feed.ingest(risk_alert("W-1", 9.0)).await;

    // The snapshot write is fire-and-forget; poll briefly for it to land
    let mut persisted = Vec::new();
    for _ in 0..50 {
        persisted = alert_store::load_snapshot(&pool).await.expect("load");
        if !persisted.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, "risk-W-1");
}

#[tokio::test]
async fn test_load_respects_capacity() {
    let (_dir, pool) = test_pool().await;

    let writer = AlertFeed::with_store(50, EventBus::new(100), pool.clone());
    for i in 0..5 {
        writer.ingest(risk_alert(&format!("W-{i}"), 9.0)).await;
    }
    writer.flush().await.expect("flush");

    // A smaller feed keeps only the newest entries from the snapshot
    let small = AlertFeed::with_store(3, EventBus::new(100), pool);
    let restored = small.load().await.expect("load");
    assert_eq!(restored, 3);

    let alerts = small.list().await;
    assert_eq!(alerts[0].id, "risk-W-4");
    assert_eq!(alerts[2].id, "risk-W-2");
}

#[tokio::test]
async fn test_memory_only_feed_has_no_store_side_effects() {
    let feed = AlertFeed::new(50, EventBus::new(100));
    feed.ingest(risk_alert("W-1", 9.0)).await;

    assert_eq!(feed.load().await.expect("load is a no-op"), 0);
    feed.flush().await.expect("flush is a no-op");
    assert_eq!(feed.len().await, 1, "memory contents untouched");
}
