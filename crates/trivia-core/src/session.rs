//! The state machine of a single game.
//!
//! A [`GameSession`] owns the roster, the question cursor, the answer
//! ledger, the completion flag and the leaderboard listeners of one game.
//! It is plain synchronous state: callers hold the session's lock (see
//! [`SessionHandle`](crate::store::SessionHandle)) for the duration of each
//! operation, which makes "record answer, check advancement, broadcast" one
//! atomic step with respect to other submissions.
//!
//! # Progression
//!
//! The cursor starts at 0. After an answer to the current question is
//! recorded, the cursor advances once every currently-joined player has
//! answered that question. Advancing past the last question completes the
//! game; a completed game never moves again.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};
use trivia_types::{
    AnswerResult, GameId, GameStatus, LeaderboardEntry, LeaderboardUpdate, Player, PlayerId,
    Question, QuestionId,
};

use crate::error::EngineError;
use crate::fanout::{ListenerId, Listeners, UpdateReceiver};
use crate::leaderboard;
use crate::ledger::AnswerLedger;

/// Explanation returned for submissions after the game finished.
pub const GAME_ENDED: &str = "game ended";
/// Explanation returned for submissions to a question that is not current.
pub const NOT_CURRENT_QUESTION: &str = "not current question";
/// Explanation returned for a repeated submission to the same question.
pub const ALREADY_ANSWERED: &str = "already answered";

/// What a submission did to the session, beyond the player-facing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The result returned to the submitting player.
    pub result: AnswerResult,
    /// Whether the cursor moved to the next question.
    pub advanced: bool,
    /// Whether this submission completed the game.
    pub completed: bool,
}

impl SubmitOutcome {
    fn rejected(reason: &str) -> Self {
        Self {
            result: AnswerResult::rejected(reason),
            advanced: false,
            completed: false,
        }
    }
}

/// Mutable state of one game.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    players: BTreeMap<PlayerId, Player>,
    questions: Arc<[Question]>,
    cursor: usize,
    ledger: AnswerLedger,
    completed: bool,
    listeners: Listeners,
    points_per_correct: u32,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Create a session at cursor 0 over the given questions.
    pub fn new(
        id: GameId,
        questions: Arc<[Question]>,
        points_per_correct: u32,
        listener_capacity: usize,
    ) -> Self {
        let now = Utc::now();
        let completed = questions.is_empty();
        Self {
            id,
            players: BTreeMap::new(),
            questions,
            cursor: 0,
            ledger: AnswerLedger::new(),
            completed,
            listeners: Listeners::new(listener_capacity),
            points_per_correct,
            created_at: now,
            completed_at: completed.then_some(now),
        }
    }

    /// The game id.
    pub const fn id(&self) -> &GameId {
        &self.id
    }

    /// Add a new player with score 0 and return its id.
    pub fn add_player(&mut self, display_name: &str) -> PlayerId {
        let id = PlayerId::new();
        self.players.insert(
            id,
            Player {
                id,
                display_name: display_name.to_owned(),
                score: 0,
            },
        );
        id
    }

    /// Look up a player.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Number of joined players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Index of the question awaiting answers.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the game has finished.
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// When the game finished.
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The question awaiting answers, `None` once complete.
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            None
        } else {
            self.questions.get(self.cursor)
        }
    }

    /// The ordered questions of this game.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Record an answer and, if warranted, advance and broadcast.
    ///
    /// Checks run in order: unknown player, game over, question not
    /// current, duplicate answer. Only a submission passing all four
    /// mutates the session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlayerNotFound`] for a player outside this
    /// game, and [`EngineError::QuestionNotFound`] for a question id that
    /// is not part of the game at all.
    pub fn submit_answer(
        &mut self,
        player_id: PlayerId,
        question_id: &QuestionId,
        selected_option: &str,
    ) -> Result<SubmitOutcome, EngineError> {
        if !self.players.contains_key(&player_id) {
            return Err(EngineError::PlayerNotFound {
                game_id: self.id.clone(),
                player_id,
            });
        }

        if self.completed {
            return Ok(SubmitOutcome::rejected(GAME_ENDED));
        }

        let questions = Arc::clone(&self.questions);
        let Some(current) = questions.get(self.cursor) else {
            return Ok(SubmitOutcome::rejected(GAME_ENDED));
        };

        if &current.id != question_id {
            if !questions.iter().any(|q| &q.id == question_id) {
                return Err(EngineError::QuestionNotFound {
                    question_id: question_id.clone(),
                });
            }
            debug!(game_id = %self.id, %player_id, %question_id, "stale answer rejected");
            return Ok(SubmitOutcome::rejected(NOT_CURRENT_QUESTION));
        }

        if !self.ledger.record(question_id, player_id) {
            debug!(game_id = %self.id, %player_id, %question_id, "duplicate answer rejected");
            return Ok(SubmitOutcome::rejected(ALREADY_ANSWERED));
        }

        let correct = current.is_correct(selected_option);
        let points_awarded = if correct { self.points_per_correct } else { 0 };
        if let Some(player) = self.players.get_mut(&player_id) {
            player.score = player.score.saturating_add(points_awarded);
        }

        let advanced = self.ledger.answer_count(question_id) >= self.player_count();
        if advanced {
            self.advance();
        }
        let completed = advanced && self.completed;

        if points_awarded > 0 || advanced {
            self.broadcast();
        }
        if completed {
            self.listeners.close_all();
        }

        Ok(SubmitOutcome {
            result: AnswerResult {
                correct,
                points_awarded,
                explanation: current.explanation.clone(),
            },
            advanced,
            completed,
        })
    }

    fn advance(&mut self) {
        self.cursor = self.cursor.saturating_add(1);
        if self.cursor >= self.questions.len() {
            self.completed = true;
            self.completed_at = Some(Utc::now());
            info!(game_id = %self.id, players = self.players.len(), "game completed");
        } else {
            info!(game_id = %self.id, question_index = self.cursor, "advanced to next question");
        }
    }

    /// Ranked leaderboard of the current scores.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard::project(self.players.values())
    }

    /// Current leaderboard wrapped with the completion flag.
    pub fn update(&self) -> LeaderboardUpdate {
        LeaderboardUpdate {
            entries: self.leaderboard(),
            game_over: self.completed,
        }
    }

    /// Push the current leaderboard to every listener.
    fn broadcast(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let update = Arc::new(self.update());
        let report = self.listeners.broadcast(&update);
        debug!(
            game_id = %self.id,
            delivered = report.delivered,
            dropped = report.dropped,
            game_over = update.game_over,
            "leaderboard broadcast"
        );
    }

    /// Open a listener queue for leaderboard updates.
    ///
    /// On a finished game the queue comes back pre-loaded with the final
    /// update and already closed, and no listener is registered.
    pub fn subscribe(&mut self) -> (Option<ListenerId>, UpdateReceiver) {
        if self.completed {
            let (tx, rx) = mpsc::channel(1);
            // A fresh channel of capacity 1 always accepts its first message.
            let _ = tx.try_send(Arc::new(self.update()));
            return (None, rx);
        }
        let (id, rx) = self.listeners.register();
        debug!(game_id = %self.id, listener = %id, listeners = self.listeners.len(), "listener registered");
        (Some(id), rx)
    }

    /// Remove a listener queue.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        if self.listeners.remove(id) {
            debug!(game_id = %self.id, listener = %id, listeners = self.listeners.len(), "listener deregistered");
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Read-only progress view.
    pub fn status(&self) -> GameStatus {
        GameStatus {
            game_id: self.id.clone(),
            player_count: saturating_u32(self.player_count()),
            question_index: saturating_u32(self.cursor),
            total_questions: saturating_u32(self.questions.len()),
            current_question_id: self.current_question().map(|q| q.id.clone()),
            completed: self.completed,
            listener_count: saturating_u32(self.listener_count()),
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
