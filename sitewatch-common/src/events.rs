//! Event types for the SiteWatch event system
//!
//! Provides shared event definitions and the EventBus used to fan alert
//! activity out to SSE clients and any other in-process subscribers.

use crate::alert::Alert;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// SiteWatch event types
///
/// Events are broadcast via [`EventBus`] and serialized for SSE
/// transmission. Subscribers receive one `AlertIngested` per ingest call,
/// in ingestion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SafetyEvent {
    /// An alert was inserted into, or upserted within, the feed
    AlertIngested {
        alert: Alert,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An alert fell off the tail of the feed to keep it within capacity
    AlertEvicted {
        alert_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Stale alerts were removed during a reconciliation purge
    AlertsPurged {
        removed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Full feed contents, sent to a subscriber on connection so late
    /// joiners can replace their local view wholesale
    FeedSnapshot {
        alerts: Vec<Alert>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SafetyEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SafetyEvent::AlertIngested { .. } => "AlertIngested",
            SafetyEvent::AlertEvicted { .. } => "AlertEvicted",
            SafetyEvent::AlertsPurged { .. } => "AlertsPurged",
            SafetyEvent::FeedSnapshot { .. } => "FeedSnapshot",
        }
    }
}

/// Central event distribution bus for application-wide events
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SafetyEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// Capacity is the number of events buffered per subscriber before the
    /// oldest are dropped; 1000 is a comfortable default for a deployment
    /// unit, tests typically use 10-100.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SafetyEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no one is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SafetyEvent,
    ) -> Result<usize, broadcast::error::SendError<SafetyEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// The feed uses this for all emissions: delivery to subscribers is
    /// best-effort and never affects ingestion.
    pub fn emit_lossy(&self, event: SafetyEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
