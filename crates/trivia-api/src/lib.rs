//! Game API server for the trivia session engine.
//!
//! This crate is the transport boundary in front of
//! [`TriviaEngine`](trivia_core::TriviaEngine). It exposes:
//!
//! - **REST endpoints** for joining, submitting answers, fetching the
//!   question list, game progress and leaderboard snapshots
//! - **`WebSocket` endpoint** (`/ws/games/{game_id}/leaderboard`) streaming
//!   leaderboard updates until the game ends
//!
//! # Architecture
//!
//! Handlers hold no game state of their own. Every request is translated
//! into one engine call; engine errors map to `404`/`400` responses with
//! a JSON body, while rejected-but-valid submissions (late, duplicate,
//! after the game) are ordinary `200` results.

pub mod error;
pub mod handlers;
pub mod router;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use startup::{bind, serve, spawn_server, ServerConfig, ServerError};
pub use state::AppState;
