//! Engine facade: the operation surface the transport layer calls.
//!
//! [`TriviaEngine`] owns the question catalog, the game rules and the
//! [`SessionStore`]. Every operation resolves its session, takes that
//! session's lock for exactly the duration of the operation, and returns
//! without waiting on anything else. The only suspension point in the
//! engine is a subscriber awaiting its next update.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use trivia_types::{
    AnswerResult, GameId, GameStatus, JoinResult, LeaderboardEntry, PlayerId, QuestionCard,
    QuestionId,
};

use crate::catalog::QuestionCatalog;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::session::GameSession;
use crate::store::{SessionHandle, SessionStore};
use crate::subscription::LeaderboardSubscription;

/// The game session engine.
#[derive(Debug)]
pub struct TriviaEngine {
    catalog: QuestionCatalog,
    config: GameConfig,
    store: SessionStore,
}

impl TriviaEngine {
    /// Create an engine with no sessions.
    pub fn new(catalog: QuestionCatalog, config: GameConfig) -> Self {
        Self {
            catalog,
            config,
            store: SessionStore::new(),
        }
    }

    /// Game rules in effect.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of sessions currently held.
    pub fn game_count(&self) -> usize {
        self.store.len()
    }

    /// Add a player to a game, creating the game if needed.
    ///
    /// An empty `game_id` starts a fresh game under a generated id; an
    /// unknown non-empty id starts a game under that id. Every call adds a
    /// distinct player, even for a repeated name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if `player_name` is empty.
    pub fn join(&self, game_id: Option<&str>, player_name: &str) -> Result<JoinResult, EngineError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(EngineError::empty("player_name"));
        }

        let requested = game_id.and_then(GameId::parse);
        let (handle, created) = self.store.get_or_create(requested, |id| {
            GameSession::new(
                id,
                self.catalog.questions(),
                self.config.points_per_correct,
                self.config.listener_capacity,
            )
        });
        if created {
            info!(game_id = %handle.id(), questions = self.catalog.len(), "game created");
        }

        let player_id = handle.write().add_player(player_name);
        let game_id = handle.id().clone();
        info!(%game_id, %player_id, player_name, "player joined");

        Ok(JoinResult {
            player_id,
            message: format!("Player {player_name} joined game {game_id}"),
            game_id,
            created,
        })
    }

    /// Score an answer to the current question of a game.
    ///
    /// Late, duplicate and post-game submissions come back as non-scoring
    /// results rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`], [`EngineError::PlayerNotFound`]
    /// or [`EngineError::QuestionNotFound`] for unknown references, and
    /// [`EngineError::InvalidArgument`] for an empty game or question id.
    pub fn submit_answer(
        &self,
        game_id: &str,
        player_id: PlayerId,
        question_id: &str,
        selected_option: &str,
    ) -> Result<AnswerResult, EngineError> {
        let handle = self.session(game_id)?;
        let question_id =
            QuestionId::parse(question_id).ok_or_else(|| EngineError::empty("question_id"))?;

        let outcome = handle
            .write()
            .submit_answer(player_id, &question_id, selected_option)?;

        debug!(
            game_id = %handle.id(),
            %player_id,
            %question_id,
            correct = outcome.result.correct,
            points = outcome.result.points_awarded,
            advanced = outcome.advanced,
            completed = outcome.completed,
            "answer processed"
        );
        Ok(outcome.result)
    }

    /// Ranked snapshot of a game's scores.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown game.
    pub fn leaderboard(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, EngineError> {
        Ok(self.session(game_id)?.read().leaderboard())
    }

    /// Subscribe to a game's leaderboard updates.
    ///
    /// Subscribing to a finished game yields exactly the final update.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown game.
    pub fn subscribe(&self, game_id: &str) -> Result<LeaderboardSubscription, EngineError> {
        let handle = self.session(game_id)?;
        Ok(LeaderboardSubscription::open(&handle))
    }

    /// The full ordered question list of a game, as player-facing cards.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown game.
    pub fn questions(&self, game_id: &str) -> Result<Vec<QuestionCard>, EngineError> {
        let handle = self.session(game_id)?;
        let time_limit = self.config.time_limit_seconds;
        let cards = handle
            .read()
            .questions()
            .iter()
            .map(|q| q.card(time_limit))
            .collect();
        Ok(cards)
    }

    /// Progress view of a game.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GameNotFound`] for an unknown game.
    pub fn status(&self, game_id: &str) -> Result<GameStatus, EngineError> {
        Ok(self.session(game_id)?.read().status())
    }

    /// Evict sessions that finished longer ago than the retention window.
    ///
    /// Returns the number of evicted sessions; always 0 when retention is
    /// unlimited.
    pub fn evict_expired(&self) -> usize {
        let Some(retention) = self.config.completed_retention() else {
            return 0;
        };
        if self.store.is_empty() {
            return 0;
        }
        let evicted = self.store.evict_completed(retention, Utc::now());
        for game_id in &evicted {
            info!(%game_id, "completed game evicted");
        }
        evicted.len()
    }

    fn session(&self, game_id: &str) -> Result<Arc<SessionHandle>, EngineError> {
        let id = GameId::parse(game_id).ok_or_else(|| EngineError::empty("game_id"))?;
        self.store
            .get(&id)
            .ok_or(EngineError::GameNotFound { game_id: id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt as _;
    use tokio::sync::Barrier;
    use trivia_types::LeaderboardUpdate;

    use super::*;
    use crate::error::ErrorKind;
    use crate::session::{ALREADY_ANSWERED, GAME_ENDED};

    const ONE_QUESTION: &str = r#"[
        {"question_id": "q1", "question_text": "Pick B", "options": ["A", "B", "C"], "correct_option": "B", "explanation": "B it is."}
    ]"#;

    const THREE_QUESTIONS: &str = r#"[
        {"question_id": "q1", "question_text": "1?", "options": ["A", "B"], "correct_option": "A"},
        {"question_id": "q2", "question_text": "2?", "options": ["A", "B"], "correct_option": "B"},
        {"question_id": "q3", "question_text": "3?", "options": ["A", "B"], "correct_option": "A"}
    ]"#;

    fn engine(catalog: &str) -> TriviaEngine {
        TriviaEngine::new(QuestionCatalog::parse(catalog).unwrap(), GameConfig::default())
    }

    #[test]
    fn join_creates_named_game_once() {
        let engine = engine(ONE_QUESTION);
        let a = engine.join(Some("g1"), "ann").unwrap();
        let b = engine.join(Some("g1"), "ann").unwrap();

        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.game_id.as_str(), "g1");
        assert_eq!(b.game_id.as_str(), "g1");
        assert_ne!(a.player_id, b.player_id);
        assert_eq!(a.message, "Player ann joined game g1");
        assert_eq!(engine.status("g1").unwrap().player_count, 2);
    }

    #[test]
    fn join_without_game_id_allocates_one() {
        let engine = engine(ONE_QUESTION);
        let a = engine.join(None, "ann").unwrap();
        let b = engine.join(Some(""), "bob").unwrap();
        assert!(a.created && b.created);
        assert_ne!(a.game_id, b.game_id);
        assert_eq!(engine.game_count(), 2);
    }

    #[test]
    fn join_rejects_empty_name() {
        let engine = engine(ONE_QUESTION);
        let err = engine.join(Some("g1"), "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(engine.game_count(), 0);
    }

    #[test]
    fn unknown_game_is_not_found() {
        let engine = engine(ONE_QUESTION);
        let err = engine.leaderboard("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(engine.subscribe("missing").is_err());
        assert!(engine.questions("missing").is_err());
        let err = engine
            .submit_answer("missing", PlayerId::new(), "q1", "B")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn empty_question_id_is_invalid() {
        let engine = engine(ONE_QUESTION);
        let join = engine.join(Some("g1"), "ann").unwrap();
        let err = engine
            .submit_answer("g1", join.player_id, "", "B")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn duplicate_submission_keeps_score() {
        let engine = engine(ONE_QUESTION);
        let p1 = engine.join(Some("g1"), "player1").unwrap().player_id;
        let _p2 = engine.join(Some("g1"), "player2").unwrap().player_id;

        let first = engine.submit_answer("g1", p1, "q1", "B").unwrap();
        assert!(first.correct);
        assert_eq!(first.points_awarded, 10);

        let second = engine.submit_answer("g1", p1, "q1", "B").unwrap();
        assert!(!second.correct);
        assert_eq!(second.points_awarded, 0);
        assert_eq!(second.explanation, ALREADY_ANSWERED);

        let board = engine.leaderboard("g1").unwrap();
        assert_eq!(board.first().map(|e| e.score), Some(10));
    }

    #[test]
    fn questions_are_served_in_catalog_order() {
        let engine = engine(THREE_QUESTIONS);
        engine.join(Some("g1"), "ann").unwrap();
        let cards = engine.questions("g1").unwrap();
        let ids: Vec<&str> = cards.iter().map(|c| c.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert!(cards.iter().all(|c| c.time_limit_seconds == 10));
    }

    #[tokio::test]
    async fn two_player_scenario_over_subscriptions() {
        let engine = engine(ONE_QUESTION);
        let p1 = engine.join(Some("g1"), "player1").unwrap().player_id;
        let p2 = engine.join(Some("g1"), "player2").unwrap().player_id;
        let mut sub_a = engine.subscribe("g1").unwrap();
        let mut sub_b = engine.subscribe("g1").unwrap();

        let r1 = engine.submit_answer("g1", p1, "q1", "B").unwrap();
        assert!(r1.correct);
        assert_eq!(r1.points_awarded, 10);
        assert_eq!(r1.explanation, "B it is.");
        assert_eq!(engine.status("g1").unwrap().question_index, 0);

        let r2 = engine.submit_answer("g1", p2, "q1", "A").unwrap();
        assert!(!r2.correct);
        assert_eq!(r2.points_awarded, 0);

        let status = engine.status("g1").unwrap();
        assert_eq!(status.question_index, 1);
        assert!(status.completed);

        for sub in [&mut sub_a, &mut sub_b] {
            let updates: Vec<Arc<LeaderboardUpdate>> = sub.collect().await;
            let last = updates.last().unwrap();
            assert!(last.game_over);
            assert_eq!(updates.iter().filter(|u| u.game_over).count(), 1);
            let rows: Vec<(PlayerId, u32, u32)> = last
                .entries
                .iter()
                .map(|e| (e.player_id, e.score, e.rank))
                .collect();
            assert_eq!(rows, vec![(p1, 10, 1), (p2, 0, 2)]);
            assert!(!sub.is_registered());
        }

        let after = engine.submit_answer("g1", p1, "q1", "B").unwrap();
        assert_eq!(after.explanation, GAME_ENDED);
        assert_eq!(after.points_awarded, 0);
    }

    #[tokio::test]
    async fn late_subscriber_gets_single_final_update() {
        let engine = engine(ONE_QUESTION);
        let p1 = engine.join(Some("g1"), "ann").unwrap().player_id;
        engine.submit_answer("g1", p1, "q1", "B").unwrap();

        let mut sub = engine.subscribe("g1").unwrap();
        let last = sub.next_update().await.unwrap();
        assert!(last.game_over);
        assert!(sub.next_update().await.is_none());
    }

    #[tokio::test]
    async fn dropped_subscription_deregisters() {
        let engine = engine(THREE_QUESTIONS);
        engine.join(Some("g1"), "ann").unwrap();
        let sub = engine.subscribe("g1").unwrap();
        let _other = engine.subscribe("g1").unwrap();
        assert!(sub.is_registered());

        let handle = engine.session("g1").unwrap();
        assert_eq!(handle.read().listener_count(), 2);
        drop(sub);
        assert_eq!(handle.read().listener_count(), 1);
    }

    #[tokio::test]
    async fn advancement_broadcasts_without_score_change() {
        let engine = engine(THREE_QUESTIONS);
        let p1 = engine.join(Some("g1"), "ann").unwrap().player_id;
        let mut sub = engine.subscribe("g1").unwrap();

        // Wrong answer, but it advances the only player's game.
        engine.submit_answer("g1", p1, "q1", "B").unwrap();
        let update = sub.next_update().await.unwrap();
        assert!(!update.game_over);
        assert_eq!(update.entries.first().map(|e| e.score), Some(0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_score_each_player_once() {
        const PLAYERS: usize = 16;
        let engine = Arc::new(engine(THREE_QUESTIONS));
        let mut players = Vec::new();
        for n in 0..PLAYERS {
            players.push(engine.join(Some("g1"), &format!("p{n}")).unwrap().player_id);
        }
        let mut sub = engine.subscribe("g1").unwrap();

        for (question, answer) in [("q1", "A"), ("q2", "B"), ("q3", "A")] {
            let barrier = Arc::new(Barrier::new(PLAYERS));
            let mut tasks = Vec::new();
            for &player in &players {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                tasks.push(tokio::spawn(async move {
                    barrier.wait().await;
                    // Every player submits twice; only the first counts.
                    let first = engine.submit_answer("g1", player, question, answer).unwrap();
                    let second = engine.submit_answer("g1", player, question, answer).unwrap();
                    (first.points_awarded, second.points_awarded)
                }));
            }
            for task in tasks {
                let (first, second) = task.await.unwrap();
                assert_eq!(first, 10);
                assert_eq!(second, 0);
            }
        }

        let status = engine.status("g1").unwrap();
        assert!(status.completed);
        let board = engine.leaderboard("g1").unwrap();
        assert!(board.iter().all(|e| e.score == 30));
        let ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=16).collect::<Vec<u32>>());

        let mut game_overs = 0;
        while let Some(update) = sub.next_update().await {
            if update.game_over {
                game_overs += 1;
            }
        }
        assert_eq!(game_overs, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_players_advance_each_game_exactly_once_per_question() {
        const PLAYERS: usize = 8;
        const GAMES: usize = 50;
        let engine = Arc::new(engine(THREE_QUESTIONS));

        for round in 0..GAMES {
            let game = format!("race-{round}");
            let players: Vec<PlayerId> = (0..PLAYERS)
                .map(|n| engine.join(Some(&game), &format!("p{n}")).unwrap().player_id)
                .collect();

            for (question, answer) in [("q1", "A"), ("q2", "B")] {
                let barrier = Arc::new(Barrier::new(PLAYERS));
                let mut tasks = Vec::new();
                for (n, &player) in players.iter().enumerate() {
                    let engine = Arc::clone(&engine);
                    let barrier = Arc::clone(&barrier);
                    let game = game.clone();
                    // Even players answer correctly, odd players do not.
                    let option = if n % 2 == 0 { answer } else { "C" };
                    tasks.push(tokio::spawn(async move {
                        barrier.wait().await;
                        let first = engine.submit_answer(&game, player, question, option).unwrap();
                        let again = engine.submit_answer(&game, player, question, option).unwrap();
                        assert_eq!(again.points_awarded, 0);
                        first.points_awarded
                    }));
                }
                let mut awarded = 0;
                for task in tasks {
                    awarded += task.await.unwrap();
                }
                assert_eq!(awarded, 10 * u32::try_from(PLAYERS / 2).unwrap());
            }

            let status = engine.status(&game).unwrap();
            assert_eq!(status.question_index, 2);
            assert!(!status.completed);
            let total: u32 = engine.leaderboard(&game).unwrap().iter().map(|e| e.score).sum();
            assert_eq!(total, 2 * 10 * u32::try_from(PLAYERS / 2).unwrap());
        }
    }

    #[test]
    fn eviction_respects_unlimited_retention() {
        let catalog = QuestionCatalog::parse(ONE_QUESTION).unwrap();
        let config = GameConfig {
            completed_retention_seconds: 0,
            ..GameConfig::default()
        };
        let engine = TriviaEngine::new(catalog, config);
        let p1 = engine.join(Some("g1"), "ann").unwrap().player_id;
        engine.submit_answer("g1", p1, "q1", "B").unwrap();
        assert_eq!(engine.evict_expired(), 0);
        assert_eq!(engine.game_count(), 1);
    }
}
