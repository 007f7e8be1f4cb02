//! REST API endpoint handlers for the game server.
//!
//! Each handler is a thin adapter: extract, call the engine, serialize.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and game count |
//! | `POST` | `/api/games/join` | Join (or start) a game |
//! | `GET` | `/api/games/:game_id` | Game progress |
//! | `GET` | `/api/games/:game_id/questions` | Ordered question cards |
//! | `POST` | `/api/games/:game_id/answers` | Submit an answer |
//! | `GET` | `/api/games/:game_id/leaderboard` | Leaderboard snapshot |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;
use trivia_types::{LeaderboardEntry, PlayerId};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/games/join`.
#[derive(Debug, serde::Deserialize)]
pub struct JoinRequest {
    /// Game to join. Absent or empty starts a new game.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Display name of the joining player.
    pub player_name: String,
}

/// Request body for `POST /api/games/:game_id/answers`.
#[derive(Debug, serde::Deserialize)]
pub struct AnswerRequest {
    /// The answering player.
    pub player_id: PlayerId,
    /// The question being answered.
    pub question_id: String,
    /// The chosen option, compared verbatim.
    pub selected_option: String,
    /// Client-side answer time (Unix seconds). Logged only.
    #[serde(default)]
    pub answer_timestamp: Option<i64>,
}

/// Response body for `GET /api/games/:game_id/leaderboard`.
#[derive(Debug, serde::Serialize)]
pub struct LeaderboardResponse {
    /// Ranked entries, best first.
    pub entries: Vec<LeaderboardEntry>,
}

/// Response body for `GET /health`.
#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    games: usize,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness and the number of games held in memory.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        games: state.engine.game_count(),
    })
}

// ---------------------------------------------------------------------------
// POST /api/games/join
// ---------------------------------------------------------------------------

/// Join a game, creating it when the id is absent or unknown.
pub async fn join(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let result = state
        .engine
        .join(request.game_id.as_deref(), &request.player_name)?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// GET /api/games/:game_id
// ---------------------------------------------------------------------------

/// Return the progress of a game.
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.engine.status(&game_id)?))
}

// ---------------------------------------------------------------------------
// GET /api/games/:game_id/questions
// ---------------------------------------------------------------------------

/// Return every question of the game, in order, without answers.
///
/// Pacing is the client's concern; each card advertises the configured
/// time limit.
pub async fn get_questions(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.engine.questions(&game_id)?))
}

// ---------------------------------------------------------------------------
// POST /api/games/:game_id/answers
// ---------------------------------------------------------------------------

/// Submit an answer to the game's current question.
///
/// Late, duplicate and post-game submissions return `200` with a
/// non-scoring result explaining why.
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    if let Some(ts) = request.answer_timestamp {
        debug!(%game_id, player_id = %request.player_id, answer_timestamp = ts, "answer received");
    }
    let result = state.engine.submit_answer(
        &game_id,
        request.player_id,
        &request.question_id,
        &request.selected_option,
    )?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// GET /api/games/:game_id/leaderboard
// ---------------------------------------------------------------------------

/// Return the current ranked leaderboard.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.engine.leaderboard(&game_id)?;
    Ok(Json(LeaderboardResponse { entries }))
}
