//! Core entity structs for the trivia game engine.
//!
//! Covers catalog questions, players, leaderboard projections, and the
//! result records returned by engine operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{GameId, PlayerId, QuestionId};

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// An immutable catalog question.
///
/// Field names on the wire follow the catalog file format
/// (`question_id`, `question_text`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Question {
    /// Catalog identifier, unique within the catalog.
    #[serde(rename = "question_id")]
    pub id: QuestionId,
    /// The question prompt.
    #[serde(rename = "question_text")]
    pub text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// The option that scores. Must be one of `options`.
    pub correct_option: String,
    /// Explanation shown after answering, whether or not the answer was right.
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Public view of this question, without the correct option.
    pub fn card(&self, time_limit_seconds: u32) -> QuestionCard {
        QuestionCard {
            question_id: self.id.clone(),
            question_text: self.text.clone(),
            options: self.options.clone(),
            time_limit_seconds,
        }
    }

    /// Whether `selected` is the correct option (exact string match).
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_option == selected
    }
}

/// A question as delivered to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestionCard {
    /// Catalog identifier to echo back when answering.
    pub question_id: QuestionId,
    /// The question prompt.
    pub question_text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Advisory answer time. Pacing is up to the client.
    pub time_limit_seconds: u32,
}

// ---------------------------------------------------------------------------
// Players and leaderboard
// ---------------------------------------------------------------------------

/// A participant in one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Name chosen on join. Not required to be unique.
    pub display_name: String,
    /// Accumulated points.
    pub score: u32,
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// 1-based position; 1 is the highest score.
    pub rank: u32,
    /// The ranked player.
    pub player_id: PlayerId,
    /// The player's display name.
    pub player_name: String,
    /// The player's score at projection time.
    pub score: u32,
}

/// Unit pushed to leaderboard subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardUpdate {
    /// Ranked entries, best first.
    pub entries: Vec<LeaderboardEntry>,
    /// Set on the final update of a game.
    pub game_over: bool,
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// Outcome of a single answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnswerResult {
    /// Whether the submission scored.
    pub correct: bool,
    /// Points added to the player's score by this submission.
    pub points_awarded: u32,
    /// The question's explanation, or the reason the submission was not scored.
    pub explanation: String,
}

impl AnswerResult {
    /// A non-scoring result carrying only a reason.
    pub fn rejected(reason: &str) -> Self {
        Self {
            correct: false,
            points_awarded: 0,
            explanation: reason.to_owned(),
        }
    }
}

/// Outcome of joining a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JoinResult {
    /// The newly allocated player.
    pub player_id: PlayerId,
    /// The game the player joined.
    pub game_id: GameId,
    /// Human-readable confirmation.
    pub message: String,
    /// Whether this join created the game.
    pub created: bool,
}

/// Read-only progress view of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameStatus {
    /// The game.
    pub game_id: GameId,
    /// Number of joined players.
    pub player_count: u32,
    /// Index of the question awaiting answers (equals `total_questions` once complete).
    pub question_index: u32,
    /// Number of questions in the game.
    pub total_questions: u32,
    /// Id of the question awaiting answers, absent once complete.
    pub current_question_id: Option<QuestionId>,
    /// Whether the game has finished.
    pub completed: bool,
    /// Number of open leaderboard subscriptions.
    pub listener_count: u32,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the last question was answered by everyone.
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            id: QuestionId::parse("q1").unwrap(),
            text: String::from("Pick B"),
            options: vec![String::from("A"), String::from("B"), String::from("C")],
            correct_option: String::from("B"),
            explanation: String::from("B is right."),
        }
    }

    #[test]
    fn question_uses_catalog_field_names() {
        let json = r#"{
            "question_id": "q1",
            "question_text": "Pick B",
            "options": ["A", "B", "C"],
            "correct_option": "B"
        }"#;
        let parsed: Result<Question, _> = serde_json::from_str(json);
        let question = parsed.ok();
        assert_eq!(question.as_ref().map(|q| q.id.as_str()), Some("q1"));
        assert_eq!(question.map(|q| q.explanation), Some(String::new()));
    }

    #[test]
    fn card_hides_correct_option() {
        let card = sample_question().card(10);
        let json = serde_json::to_value(&card).ok();
        assert!(json.as_ref().is_some_and(|v| v.get("correct_option").is_none()));
        assert_eq!(card.time_limit_seconds, 10);
        assert_eq!(card.options.len(), 3);
    }

    #[test]
    fn correctness_is_exact_match() {
        let q = sample_question();
        assert!(q.is_correct("B"));
        assert!(!q.is_correct("b"));
        assert!(!q.is_correct(" B"));
    }
}
