//! Per-session broadcast fan-out of leaderboard updates.
//!
//! Every subscriber owns a bounded [`mpsc`] queue. Pushes use
//! [`try_send`](mpsc::Sender::try_send) so the answering path never waits
//! on a consumer: a listener whose queue is closed (consumer gone) or full
//! (consumer not keeping up) is deregistered on the spot, and the failure
//! stays with that listener.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use trivia_types::LeaderboardUpdate;

/// Handle identifying one registered listener within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving half handed to a subscriber.
pub type UpdateReceiver = mpsc::Receiver<Arc<LeaderboardUpdate>>;

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Listeners that accepted the update.
    pub delivered: usize,
    /// Listeners removed because they were closed or full.
    pub dropped: usize,
}

/// The set of active listener queues of one session.
#[derive(Debug)]
pub struct Listeners {
    next_id: u64,
    capacity: usize,
    senders: BTreeMap<ListenerId, mpsc::Sender<Arc<LeaderboardUpdate>>>,
}

impl Listeners {
    /// Create an empty set whose queues hold `capacity` updates each.
    pub fn new(capacity: usize) -> Self {
        Self {
            next_id: 0,
            capacity: capacity.max(1),
            senders: BTreeMap::new(),
        }
    }

    /// Register a new listener queue.
    pub fn register(&mut self) -> (ListenerId, UpdateReceiver) {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders.insert(id, tx);
        (id, rx)
    }

    /// Remove a listener. Returns whether it was still registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.senders.remove(&id).is_some()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Push `update` to every listener without waiting.
    pub fn broadcast(&mut self, update: &Arc<LeaderboardUpdate>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        self.senders.retain(|id, tx| match tx.try_send(Arc::clone(update)) {
            Ok(()) => {
                report.delivered = report.delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(listener = %id, "leaderboard listener queue full, dropping listener");
                report.dropped = report.dropped.saturating_add(1);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(listener = %id, "leaderboard listener gone, dropping listener");
                report.dropped = report.dropped.saturating_add(1);
                false
            }
        });
        report
    }

    /// Drop every sender, ending all subscriber streams once they drain.
    pub fn close_all(&mut self) {
        self.senders.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn update(game_over: bool) -> Arc<LeaderboardUpdate> {
        Arc::new(LeaderboardUpdate {
            entries: Vec::new(),
            game_over,
        })
    }

    #[tokio::test]
    async fn every_listener_receives_each_update_in_order() {
        let mut listeners = Listeners::new(8);
        let (_, mut rx_a) = listeners.register();
        let (_, mut rx_b) = listeners.register();

        let report = listeners.broadcast(&update(false));
        assert_eq!(report.delivered, 2);
        listeners.broadcast(&update(true));

        for rx in [&mut rx_a, &mut rx_b] {
            assert!(!rx.recv().await.unwrap().game_over);
            assert!(rx.recv().await.unwrap().game_over);
        }
    }

    #[test]
    fn closed_listener_is_removed() {
        let mut listeners = Listeners::new(8);
        let (_, rx) = listeners.register();
        let (_, _keep) = listeners.register();
        drop(rx);

        let report = listeners.broadcast(&update(false));
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn full_listener_is_removed_without_blocking() {
        let mut listeners = Listeners::new(1);
        let (_, _slow) = listeners.register();

        assert_eq!(listeners.broadcast(&update(false)).delivered, 1);
        let report = listeners.broadcast(&update(false));
        assert_eq!(report.dropped, 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn explicit_remove() {
        let mut listeners = Listeners::new(4);
        let (id, _rx) = listeners.register();
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
    }

    #[tokio::test]
    async fn close_all_ends_streams_after_drain() {
        let mut listeners = Listeners::new(4);
        let (_, mut rx) = listeners.register();
        listeners.broadcast(&update(true));
        listeners.close_all();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
