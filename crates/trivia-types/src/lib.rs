//! Shared type definitions for the trivia game session engine.
//!
//! Types defined here are used by the engine core and the transport
//! layer alike, and flow downstream to `TypeScript` via `ts-rs` for the
//! browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes for players, games and questions
//! - [`structs`] -- Questions, players, leaderboard and result records

pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{GameId, PlayerId, QuestionId};
pub use structs::{
    AnswerResult, GameStatus, JoinResult, LeaderboardEntry, LeaderboardUpdate, Player, Question,
    QuestionCard,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the browser client.

    #[test]
    fn export_bindings() {
        // Types carry #[ts(export)]; exporting here writes them to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::GameId::export_all();
        let _ = crate::ids::QuestionId::export_all();

        let _ = crate::structs::Question::export_all();
        let _ = crate::structs::QuestionCard::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::LeaderboardEntry::export_all();
        let _ = crate::structs::LeaderboardUpdate::export_all();
        let _ = crate::structs::AnswerResult::export_all();
        let _ = crate::structs::JoinResult::export_all();
        let _ = crate::structs::GameStatus::export_all();
    }
}
