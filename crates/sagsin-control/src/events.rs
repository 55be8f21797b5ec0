//! In-process event fabric for SSE `/events` subscribers.
//!
//! Grounded on `strata-control::state::AppState`'s
//! `dashboard_tx: broadcast::Sender<DashboardEvent>`, but generalized
//! from a single broadcast channel (shared lagged-receiver semantics)
//! to one bounded queue per subscriber, dropped independently on
//! back-pressure — the spec requires per-subscriber drop, not a shared
//! lag counter.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use sagsin_common::protocol::PacketProgressEvent;
use tokio::sync::mpsc;

/// Bounded capacity of each subscriber's queue.
const SUBSCRIBER_QUEUE_CAPACITY: usize = 64;

#[derive(Default)]
pub struct EventFabric {
    subscribers: DashMap<u64, mpsc::Sender<PacketProgressEvent>>,
    next_id: AtomicU64,
}

impl EventFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber, returning its id (for later
    /// unregistration) and the receiving half of its queue.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<PacketProgressEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot the current subscriber set, then attempt a non-blocking
    /// enqueue on each. A full queue drops the frame for that subscriber
    /// only — the broadcaster never blocks.
    pub fn broadcast(&self, event: PacketProgressEvent) {
        let ids: Vec<u64> = self.subscribers.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some(tx) = self.subscribers.get(&id) {
                if tx.try_send(event.clone()).is_err() {
                    tracing::debug!(subscriber_id = id, "subscriber queue full, dropping frame");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagsin_common::protocol::PacketStatus;

    fn event() -> PacketProgressEvent {
        PacketProgressEvent::new(PacketStatus::Pending, "s1", 0, 0.0, None)
    }

    #[test]
    fn broadcast_with_no_subscribers_is_a_no_op() {
        let fabric = EventFabric::new();
        fabric.broadcast(event());
    }

    #[tokio::test]
    async fn subscriber_receives_broadcast_events() {
        let fabric = EventFabric::new();
        let (_id, mut rx) = fabric.subscribe();
        fabric.broadcast(event());
        let received = rx.recv().await.unwrap();
        assert_eq!(received.session_id, "s1");
    }

    #[tokio::test]
    async fn unsubscribed_id_no_longer_receives_events() {
        let fabric = EventFabric::new();
        let (id, mut rx) = fabric.subscribe();
        fabric.unsubscribe(id);
        fabric.broadcast(event());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_drops_frames_for_that_subscriber_only() {
        let fabric = EventFabric::new();
        let (_id, mut rx) = fabric.subscribe();
        for _ in 0..(SUBSCRIBER_QUEUE_CAPACITY + 10) {
            fabric.broadcast(event());
        }
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        assert!(drained <= SUBSCRIBER_QUEUE_CAPACITY);
    }
}
