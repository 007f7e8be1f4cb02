//! Per-question record of which players have answered.

use std::collections::{BTreeMap, BTreeSet};

use trivia_types::{PlayerId, QuestionId};

/// Mapping from question id to the set of players who answered it.
///
/// Grows monotonically. An entry is created on the first answer to a
/// question, and a player appears at most once per question.
#[derive(Debug, Clone, Default)]
pub struct AnswerLedger {
    answered: BTreeMap<QuestionId, BTreeSet<PlayerId>>,
}

impl AnswerLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `player` answered `question`.
    ///
    /// Returns `false` (and changes nothing) if the player had already
    /// answered it.
    pub fn record(&mut self, question: &QuestionId, player: PlayerId) -> bool {
        self.answered
            .entry(question.clone())
            .or_default()
            .insert(player)
    }

    /// Number of distinct players who answered `question`.
    pub fn answer_count(&self, question: &QuestionId) -> usize {
        self.answered.get(question).map_or(0, BTreeSet::len)
    }
}
