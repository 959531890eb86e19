//! Server-Sent Events (SSE) stream
//!
//! Streams feed activity to connected subscribers. Every new connection
//! first receives a `FeedSnapshot` carrying the authoritative feed, so late
//! joiners and reconnecting clients can replace their local view wholesale
//! before live events resume.

use crate::state::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use sitewatch_common::events::SafetyEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before snapshotting so no ingest between the two is lost;
    // an event duplicated into the snapshot is harmless (view replacement).
    let rx = ctx.feed.subscribe();
    let snapshot = SafetyEvent::FeedSnapshot {
        alerts: ctx.feed.list().await,
        timestamp: chrono::Utc::now(),
    };

    let stream = async_stream::stream! {
        if let Some(event) = to_sse_event(&snapshot) {
            yield Ok(event);
        }

        let mut events = BroadcastStream::new(rx);
        while let Some(result) = events.next().await {
            match result {
                Ok(event) => {
                    if let Some(event) = to_sse_event(&event) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    // Lagged subscriber; skip and continue
                    warn!("SSE stream error: {:?}", e);
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Serialize a SafetyEvent into an SSE frame
fn to_sse_event(event: &SafetyEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
