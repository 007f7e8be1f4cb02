//! Axum router construction for the game API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled for the browser client.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the game server.
///
/// The router includes:
/// - `GET /health` -- liveness
/// - `POST /api/games/join` -- join or start a game
/// - `GET /api/games/{game_id}` -- game progress
/// - `GET /api/games/{game_id}/questions` -- ordered question cards
/// - `POST /api/games/{game_id}/answers` -- submit an answer
/// - `GET /api/games/{game_id}/leaderboard` -- leaderboard snapshot
/// - `GET /ws/games/{game_id}/leaderboard` -- `WebSocket` leaderboard stream
///
/// CORS allows any origin so the browser client can be served from
/// anywhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // REST API
        .route("/api/games/join", post(handlers::join))
        .route("/api/games/{game_id}", get(handlers::get_game))
        .route("/api/games/{game_id}/questions", get(handlers::get_questions))
        .route("/api/games/{game_id}/answers", post(handlers::submit_answer))
        .route("/api/games/{game_id}/leaderboard", get(handlers::get_leaderboard))
        // WebSocket
        .route("/ws/games/{game_id}/leaderboard", get(ws::ws_leaderboard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
