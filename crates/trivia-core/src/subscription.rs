//! Leaderboard subscription streams.
//!
//! A [`LeaderboardSubscription`] yields every update pushed to its session
//! after it was opened, in push order. It ends after delivering an update
//! with `game_over` set, or when its queue is closed. Dropping it
//! deregisters its listener queue from the session immediately.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use trivia_types::LeaderboardUpdate;

use crate::fanout::{ListenerId, UpdateReceiver};
use crate::store::SessionHandle;

/// A per-caller stream of leaderboard updates.
#[derive(Debug)]
pub struct LeaderboardSubscription {
    receiver: UpdateReceiver,
    registration: Option<(Weak<SessionHandle>, ListenerId)>,
    finished: bool,
}

impl LeaderboardSubscription {
    /// Open a subscription on `handle`.
    pub fn open(handle: &Arc<SessionHandle>) -> Self {
        let (listener, receiver) = handle.write().subscribe();
        Self {
            receiver,
            registration: listener.map(|id| (Arc::downgrade(handle), id)),
            finished: false,
        }
    }

    /// Wait for the next update. `None` once the stream has ended.
    pub async fn next_update(&mut self) -> Option<Arc<LeaderboardUpdate>> {
        std::future::poll_fn(|cx| self.poll_update(cx)).await
    }

    /// Whether the listener queue is still registered with its session.
    pub const fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    fn poll_update(&mut self, cx: &mut Context<'_>) -> Poll<Option<Arc<LeaderboardUpdate>>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(update)) => {
                if update.game_over {
                    self.finish();
                }
                Poll::Ready(Some(update))
            }
            Poll::Ready(None) => {
                self.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.receiver.close();
        self.deregister();
    }

    fn deregister(&mut self) {
        if let Some((session, id)) = self.registration.take() {
            if let Some(handle) = session.upgrade() {
                handle.write().unsubscribe(id);
            }
        }
    }
}

impl Stream for LeaderboardSubscription {
    type Item = Arc<LeaderboardUpdate>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_update(cx)
    }
}

impl Drop for LeaderboardSubscription {
    fn drop(&mut self) {
        self.deregister();
    }
}
