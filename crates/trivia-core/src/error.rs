//! Error types for engine operations.
//!
//! Only hard failures are errors. Submissions that arrive after the game
//! ended, for a question that is no longer current, or twice for the same
//! question are ordinary [`AnswerResult`](trivia_types::AnswerResult)s so
//! clients can render them without special-casing transport errors.

use trivia_types::{GameId, PlayerId, QuestionId};

/// Coarse classification of an [`EngineError`], for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced game, player or question does not exist.
    NotFound,
    /// A required field was empty or malformed.
    InvalidArgument,
}

/// Errors returned by [`TriviaEngine`](crate::engine::TriviaEngine) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No session exists for the game id.
    #[error("game not found: {game_id}")]
    GameNotFound {
        /// The unknown game id.
        game_id: GameId,
    },

    /// The player is not part of the game.
    #[error("player {player_id} not found in game {game_id}")]
    PlayerNotFound {
        /// The game that was searched.
        game_id: GameId,
        /// The unknown player id.
        player_id: PlayerId,
    },

    /// The question id is not part of the game's question set.
    #[error("question not found: {question_id}")]
    QuestionNotFound {
        /// The unknown question id.
        question_id: QuestionId,
    },

    /// A required argument was empty or malformed.
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl EngineError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::GameNotFound { .. }
            | Self::PlayerNotFound { .. }
            | Self::QuestionNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn empty(field: &'static str) -> Self {
        Self::InvalidArgument {
            field,
            reason: String::from("must not be empty"),
        }
    }
}
