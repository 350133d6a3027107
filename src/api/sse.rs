//! Server-Sent Events support
//!
//! The display surface subscribes here to learn about appended turns,
//! rebuild directives and notices as they happen.

use crate::runtime::{Snapshot, SseEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init: Snapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with the snapshot then broadcasts
    let init =
        futures::stream::once(async move { Ok(sse_event_to_axum(SseEvent::Snapshot(init))) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        Err(e) => {
            // A lagging display has missed turns; the client re-fetches on its next rebuild
            tracing::warn!(error = %e, "SSE subscriber lagged");
            None
        }
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = sse_event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn sse_event_payload(event: SseEvent) -> (&'static str, serde_json::Value) {
    match event {
        SseEvent::Snapshot(snapshot) => (
            "snapshot",
            json!({ "type": "snapshot", "snapshot": snapshot }),
        ),
        SseEvent::Turns { turns, phase } => (
            "turns",
            json!({ "type": "turns", "turns": turns, "phase": phase }),
        ),
        SseEvent::Rebuild(snapshot) => (
            "rebuild",
            json!({ "type": "rebuild", "snapshot": snapshot }),
        ),
        SseEvent::Notice(notice) => (
            "notice",
            json!({ "type": "notice", "notice": notice }),
        ),
    }
}
