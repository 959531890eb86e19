//! Alert feed aggregator
//!
//! Owns the bounded, newest-first collection of alerts. All mutation goes
//! through the write half of a single RwLock, so concurrent producers can
//! score and classify in parallel while ingestion stays serialized and the
//! capacity/ordering invariants hold. Readers get point-in-time clones and
//! never observe a partially-mutated feed.
//!
//! Persistence is write-behind: every mutation spawns a best-effort
//! snapshot save. A failed write is logged and never rolls back memory;
//! the in-memory feed is authoritative.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use sitewatch_common::db;
use sitewatch_common::events::{EventBus, SafetyEvent};
use sitewatch_common::Alert;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Default maximum number of alerts retained in the live feed
pub const DEFAULT_CAPACITY: usize = 50;

/// Default age horizon for stale-alert purging, in hours
pub const DEFAULT_PURGE_HORIZON_HOURS: i64 = 24;

/// The live alert feed
///
/// Explicitly owned and injectable: construct one per deployment unit and
/// share it via `Arc`, never through module-level globals.
#[derive(Clone)]
pub struct AlertFeed {
    capacity: usize,
    entries: Arc<RwLock<Vec<Alert>>>,
    events: EventBus,
    store: Option<SqlitePool>,
}

impl AlertFeed {
    /// Create a memory-only feed (no durability)
    pub fn new(capacity: usize, events: EventBus) -> Self {
        Self {
            capacity,
            entries: Arc::new(RwLock::new(Vec::new())),
            events,
            store: None,
        }
    }

    /// Create a feed backed by the alert snapshot store
    pub fn with_store(capacity: usize, events: EventBus, store: SqlitePool) -> Self {
        Self {
            capacity,
            entries: Arc::new(RwLock::new(Vec::new())),
            events,
            store: Some(store),
        }
    }

    /// Replace the in-memory feed with the persisted snapshot
    ///
    /// Used at startup and by late-joining processes to reconcile with the
    /// last known feed state. Returns the number of restored alerts.
    pub async fn load(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let mut alerts = db::alerts::load_snapshot(store).await?;
        alerts.truncate(self.capacity);

        let mut entries = self.entries.write().await;
        *entries = alerts;
        info!("Restored {} alert(s) from snapshot", entries.len());
        Ok(entries.len())
    }

    /// Insert or replace an alert by id
    ///
    /// An existing alert with the same id is removed first, so a re-evaluated
    /// alert moves to the front with its new content. The arrival timestamp
    /// is stamped here. If the feed would exceed capacity, the oldest
    /// entries are evicted. Subscribers receive exactly one `AlertIngested`
    /// per call, in the order ingest calls were serialized.
    pub async fn ingest(&self, mut alert: Alert) {
        alert.arrived_at = Utc::now();

        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.iter().position(|a| a.id == alert.id) {
            entries.remove(existing);
            debug!("Upserting alert {}", alert.id);
        } else {
            debug!("Ingesting new alert {}", alert.id);
        }
        entries.insert(0, alert.clone());

        let mut evicted = Vec::new();
        while entries.len() > self.capacity {
            if let Some(oldest) = entries.pop() {
                evicted.push(oldest.id);
            }
        }

        // Emit while still holding the write lock so subscribers observe
        // pushes in exactly the serialized ingestion order.
        self.events.emit_lossy(SafetyEvent::AlertIngested {
            alert,
            timestamp: Utc::now(),
        });
        for alert_id in evicted {
            debug!("Evicted alert {} (feed at capacity)", alert_id);
            self.events.emit_lossy(SafetyEvent::AlertEvicted {
                alert_id,
                timestamp: Utc::now(),
            });
        }
        drop(entries);

        self.persist().await;
    }

    /// Remove alerts that arrived strictly before `now - horizon`
    ///
    /// Called by the owner during reconciliation, never from a background
    /// timer; the caller decides the cadence. Entries exactly at the
    /// boundary are retained. Returns the number of removed alerts.
    pub async fn purge_stale(&self, horizon: Duration) -> usize {
        self.purge_older_than(Utc::now() - horizon).await
    }

    /// Remove alerts that arrived strictly before the cutoff
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|alert| alert.arrived_at >= cutoff);
            let removed = before - entries.len();
            if removed > 0 {
                self.events.emit_lossy(SafetyEvent::AlertsPurged {
                    removed,
                    timestamp: Utc::now(),
                });
            }
            removed
        };

        if removed > 0 {
            info!("Purged {} stale alert(s)", removed);
            self.persist().await;
        }
        removed
    }

    /// Current ordered (newest-first) snapshot of the feed
    pub async fn list(&self) -> Vec<Alert> {
        self.entries.read().await.clone()
    }

    /// Subscribe to feed events (one `AlertIngested` per ingest call)
    pub fn subscribe(&self) -> broadcast::Receiver<SafetyEvent> {
        self.events.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Synchronously write the current snapshot to the store
    ///
    /// Used on shutdown and by tests; regular mutations persist in the
    /// background via [`AlertFeed::persist`].
    pub async fn flush(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let snapshot = self.entries.read().await.clone();
        db::alerts::replace_snapshot(store, &snapshot).await?;
        Ok(())
    }

    /// Fire-and-forget snapshot write; never blocks the caller on I/O
    async fn persist(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let snapshot = self.entries.read().await.clone();
        tokio::spawn(async move {
            if let Err(e) = db::alerts::replace_snapshot(&store, &snapshot).await {
                warn!("Alert snapshot write failed (feed stays in memory): {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewatch_common::{AlertSource, Severity};

    fn alert(worker_id: &str, description: &str) -> Alert {
        let source = AlertSource::Risk {
            worker_id: worker_id.to_string(),
        };
        Alert {
            id: source.id(),
            source,
            severity: Severity::Medium,
            label: "watch".to_string(),
            title: format!("Watch Risk: {worker_id}"),
            description: description.to_string(),
            reasons: vec![],
            recommended_actions: vec![],
            worker_id: Some(worker_id.to_string()),
            risk_score: Some(45),
            site_location: None,
            arrived_at: Utc::now(),
        }
    }

    fn feed(capacity: usize) -> AlertFeed {
        AlertFeed::new(capacity, EventBus::new(100))
    }

    #[tokio::test]
    async fn test_ingest_inserts_newest_first() {
        let feed = feed(50);
        feed.ingest(alert("W-1", "first")).await;
        feed.ingest(alert("W-2", "second")).await;
        feed.ingest(alert("W-3", "third")).await;

        let alerts = feed.list().await;
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].id, "risk-W-3");
        assert_eq!(alerts[1].id, "risk-W-2");
        assert_eq!(alerts[2].id, "risk-W-1");
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_moves_to_front() {
        let feed = feed(50);
        feed.ingest(alert("W-1", "original")).await;
        feed.ingest(alert("W-2", "other")).await;
        feed.ingest(alert("W-1", "re-evaluated")).await;

        let alerts = feed.list().await;
        assert_eq!(alerts.len(), 2, "same id must not duplicate");
        assert_eq!(alerts[0].id, "risk-W-1");
        assert_eq!(alerts[0].description, "re-evaluated");
        assert_eq!(alerts[1].id, "risk-W-2");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let feed = feed(50);
        for i in 0..51 {
            feed.ingest(alert(&format!("W-{i}"), "x")).await;
        }

        let alerts = feed.list().await;
        assert_eq!(alerts.len(), 50);
        assert_eq!(alerts[0].id, "risk-W-50", "newest retained");
        assert!(
            !alerts.iter().any(|a| a.id == "risk-W-0"),
            "oldest evicted"
        );
    }

    #[tokio::test]
    async fn test_feed_never_exceeds_capacity() {
        let feed = feed(5);
        for i in 0..100 {
            // Re-ingest a rotating set of ids so upserts and inserts mix
            feed.ingest(alert(&format!("W-{}", i % 8), "x")).await;
            assert!(feed.len().await <= 5);
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_each_ingest_in_order() {
        let feed = feed(50);
        let mut rx = feed.subscribe();

        feed.ingest(alert("W-1", "a")).await;
        feed.ingest(alert("W-2", "b")).await;
        feed.ingest(alert("W-1", "c")).await; // upsert still pushes

        for expected in ["risk-W-1", "risk-W-2", "risk-W-1"] {
            match rx.try_recv().expect("event expected") {
                SafetyEvent::AlertIngested { alert, .. } => assert_eq!(alert.id, expected),
                other => panic!("unexpected event {:?}", other.event_type()),
            }
        }
        assert!(rx.try_recv().is_err(), "exactly one event per ingest");
    }

    #[tokio::test]
    async fn test_eviction_emits_event() {
        let feed = feed(1);
        let mut rx = feed.subscribe();

        feed.ingest(alert("W-1", "a")).await;
        feed.ingest(alert("W-2", "b")).await;

        let mut evicted = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SafetyEvent::AlertEvicted { alert_id, .. } = event {
                evicted.push(alert_id);
            }
        }
        assert_eq!(evicted, vec!["risk-W-1".to_string()]);
    }

    #[tokio::test]
    async fn test_list_is_a_point_in_time_snapshot() {
        let feed = feed(50);
        feed.ingest(alert("W-1", "a")).await;

        let snapshot = feed.list().await;
        feed.ingest(alert("W-2", "b")).await;

        assert_eq!(snapshot.len(), 1, "snapshot unaffected by later ingests");
        assert_eq!(feed.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_purge_removes_only_strictly_older() {
        let feed = feed(50);
        feed.ingest(alert("W-1", "old")).await;
        feed.ingest(alert("W-2", "boundary")).await;
        feed.ingest(alert("W-3", "fresh")).await;

        // Backdate the first entry well past the horizon
        {
            let mut entries = feed.entries.write().await;
            let oldest = entries.last_mut().expect("entry");
            oldest.arrived_at = Utc::now() - Duration::hours(30);
        }

        let boundary = feed.list().await[1].arrived_at;
        let removed = feed.purge_older_than(boundary).await;

        assert_eq!(removed, 1);
        let alerts = feed.list().await;
        assert_eq!(alerts.len(), 2);
        assert!(
            alerts.iter().any(|a| a.id == "risk-W-2"),
            "entry exactly at the cutoff is retained"
        );
        assert!(alerts.iter().any(|a| a.id == "risk-W-3"));
    }

    #[tokio::test]
    async fn test_purge_stale_on_fresh_feed_removes_nothing() {
        let feed = feed(50);
        feed.ingest(alert("W-1", "a")).await;

        let removed = feed.purge_stale(Duration::hours(DEFAULT_PURGE_HORIZON_HOURS)).await;
        assert_eq!(removed, 0);
        assert_eq!(feed.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_ingest_preserves_invariants() {
        let feed = feed(10);
        let mut handles = Vec::new();
        for task in 0..8 {
            let feed = feed.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    feed.ingest(alert(&format!("W-{}-{}", task, i % 4), "x")).await;
                }
            }));
        }
        for handle in handles {
            handle.await.expect("task");
        }

        let alerts = feed.list().await;
        assert!(alerts.len() <= 10);
        // No duplicate ids survive the interleaving
        let mut ids: Vec<_> = alerts.iter().map(|a| a.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), alerts.len());
    }
}
