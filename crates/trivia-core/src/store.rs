//! Session store: game id to session mapping.
//!
//! Each session lives behind its own [`RwLock`] inside a [`SessionHandle`],
//! so games never contend with one another. The store's own lock covers
//! only the map itself: lookups take it shared, and create-if-absent and
//! eviction take it exclusively for the insert or removal alone.
//!
//! Locks here are never held across an `.await`, which is why they are
//! the blocking [`std::sync`] kind. That also lets a subscription
//! deregister itself synchronously when it is dropped.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use trivia_types::GameId;

use crate::session::GameSession;

/// One game session and its mutual-exclusion domain.
#[derive(Debug)]
pub struct SessionHandle {
    id: GameId,
    state: RwLock<GameSession>,
}

impl SessionHandle {
    /// Wrap a session.
    pub fn new(session: GameSession) -> Self {
        Self {
            id: session.id().clone(),
            state: RwLock::new(session),
        }
    }

    /// The game id, readable without locking.
    pub const fn id(&self) -> &GameId {
        &self.id
    }

    /// Shared access for reads.
    ///
    /// A poisoned lock is recovered: session mutations never leave a
    /// half-applied answer behind a panic point.
    pub fn read(&self) -> RwLockReadGuard<'_, GameSession> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, GameSession> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// All live sessions, keyed by game id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<GameId, Arc<SessionHandle>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `requested`, creating the session with `seed` when absent.
    ///
    /// With no requested id a fresh unique one is allocated. Returns the
    /// handle and whether it was created by this call.
    pub fn get_or_create<F>(&self, requested: Option<GameId>, seed: F) -> (Arc<SessionHandle>, bool)
    where
        F: FnOnce(GameId) -> GameSession,
    {
        let id = match requested {
            Some(id) => {
                if let Some(existing) = self.get(&id) {
                    return (existing, false);
                }
                id
            }
            None => self.unused_id(),
        };

        let mut sessions = self.write_map();
        if let Some(existing) = sessions.get(&id) {
            // Lost the race to another joiner of the same new game.
            return (Arc::clone(existing), false);
        }
        let handle = Arc::new(SessionHandle::new(seed(id.clone())));
        sessions.insert(id, Arc::clone(&handle));
        (handle, true)
    }

    fn unused_id(&self) -> GameId {
        loop {
            let id = GameId::generate();
            if !self.read_map().contains_key(&id) {
                return id;
            }
        }
    }

    /// Look up a session.
    pub fn get(&self, id: &GameId) -> Option<Arc<SessionHandle>> {
        self.read_map().get(id).map(Arc::clone)
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    /// Remove sessions that completed at least `retention` before `now`.
    ///
    /// Sessions still in progress are never evicted. Returns the ids of
    /// the removed sessions.
    pub fn evict_completed(&self, retention: Duration, now: DateTime<Utc>) -> Vec<GameId> {
        let retention = TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX);
        let mut evicted = Vec::new();
        self.write_map().retain(|id, handle| {
            let expired = handle
                .read()
                .completed_at()
                .is_some_and(|done| now.signed_duration_since(done) >= retention);
            if expired {
                evicted.push(id.clone());
            }
            !expired
        });
        evicted
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<GameId, Arc<SessionHandle>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<GameId, Arc<SessionHandle>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use trivia_types::{Question, QuestionId};

    use super::*;

    fn questions() -> Arc<[Question]> {
        vec![Question {
            id: QuestionId::parse("q1").unwrap(),
            text: String::from("Pick B"),
            options: vec![String::from("A"), String::from("B")],
            correct_option: String::from("B"),
            explanation: String::new(),
        }]
        .into()
    }

    fn seed(id: GameId) -> GameSession {
        GameSession::new(id, questions(), 10, 4)
    }

    #[test]
    fn creates_then_reuses_named_game() {
        let store = SessionStore::new();
        let g1 = GameId::parse("g1");

        let (first, created) = store.get_or_create(g1.clone(), seed);
        assert!(created);
        let (second, created_again) = store.get_or_create(g1, seed);
        assert!(!created_again);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_id_allocates_fresh_games() {
        let store = SessionStore::new();
        let (a, _) = store.get_or_create(None, seed);
        let (b, _) = store.get_or_create(None, seed);
        assert_ne!(a.id(), b.id());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sessions_share_the_catalog_slice() {
        let shared = questions();
        let store = SessionStore::new();
        let (a, _) = store.get_or_create(None, |id| GameSession::new(id, Arc::clone(&shared), 10, 4));
        let (b, _) = store.get_or_create(None, |id| GameSession::new(id, Arc::clone(&shared), 10, 4));
        assert!(core::ptr::eq(a.read().questions(), b.read().questions()));
    }

    #[test]
    fn evicts_only_expired_completed_sessions() {
        let store = SessionStore::new();
        let (done, _) = store.get_or_create(GameId::parse("done"), seed);
        let (_running, _) = store.get_or_create(GameId::parse("running"), seed);
        {
            let mut session = done.write();
            let p = session.add_player("ann");
            session
                .submit_answer(p, &QuestionId::parse("q1").unwrap(), "B")
                .unwrap();
        }

        let retention = Duration::from_secs(60);
        assert!(store.evict_completed(retention, Utc::now()).is_empty());

        let later = Utc::now() + TimeDelta::seconds(61);
        let evicted = store.evict_completed(retention, later);
        assert_eq!(evicted, vec![GameId::parse("done").unwrap()]);
        assert_eq!(store.len(), 1);
        assert!(store.get(&GameId::parse("running").unwrap()).is_some());
    }
}
