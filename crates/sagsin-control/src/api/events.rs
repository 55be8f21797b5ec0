//! GET /events — SSE stream of `packet-progress` frames.
//!
//! Grounded on `strata-control::ws_dashboard`'s subscribe/forward loop,
//! adapted from a WebSocket push to an SSE stream: an initial `:ok`
//! comment confirms the connection, frames are forwarded as they
//! arrive, and a `:keepalive` comment is emitted after 15s of silence
//! so intermediaries don't time out the connection.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(events))
}

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, rx) = state.events().subscribe();

    let initial = stream::once(async { Ok(Event::default().comment("ok")) });
    let frames = SubscriberOwnedStream { state, id, rx: Some(rx) }.map(|evt| {
        Ok(Event::default()
            .event("packet-progress")
            .json_data(&evt)
            .unwrap_or_else(|_| Event::default().comment("serialization error")))
    });

    Sse::new(initial.chain(frames)).keep_alive(
        KeepAlive::new()
            .interval(KEEPALIVE_INTERVAL)
            .text("keepalive"),
    )
}

/// Owns `AppState` (cheaply `Clone`, an `Arc` internally) so the
/// subscription outlives the handler call and is torn down on drop
/// regardless of how the stream future is cancelled.
struct SubscriberOwnedStream {
    state: AppState,
    id: u64,
    rx: Option<mpsc::Receiver<sagsin_common::protocol::PacketProgressEvent>>,
}

impl Stream for SubscriberOwnedStream {
    type Item = sagsin_common::protocol::PacketProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.rx {
            Some(rx) => rx.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for SubscriberOwnedStream {
    fn drop(&mut self) {
        self.state.events().unsubscribe(self.id);
    }
}
