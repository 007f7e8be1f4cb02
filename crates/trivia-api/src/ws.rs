//! `WebSocket` handler for leaderboard subscriptions.
//!
//! Clients connect to `GET /ws/games/:game_id/leaderboard` and receive a
//! JSON-encoded [`LeaderboardUpdate`](trivia_types::LeaderboardUpdate)
//! text frame for every update pushed to the game after they connected.
//! The server closes the socket after the update carrying `game_over`.
//! A client that closes or drops the connection cancels its subscription,
//! which deregisters it from the game.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};
use trivia_core::LeaderboardSubscription;

use crate::error::ApiError;
use crate::state::AppState;

/// Subscribe to a game's leaderboard and upgrade to a `WebSocket`.
///
/// The game is resolved before the upgrade, so an unknown game is a
/// plain `404` response.
///
/// # Route
///
/// `GET /ws/games/:game_id/leaderboard`
pub async fn ws_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state.engine.subscribe(&game_id)?;
    let ws = ws?;
    Ok(ws.on_upgrade(move |socket| stream_leaderboard(socket, subscription, game_id)))
}

/// Forward subscription updates as text frames until the game ends or the
/// client goes away.
async fn stream_leaderboard(
    mut socket: WebSocket,
    mut subscription: LeaderboardSubscription,
    game_id: String,
) {
    debug!(%game_id, "leaderboard subscriber connected");

    loop {
        tokio::select! {
            update = subscription.next_update() => {
                let Some(update) = update else {
                    debug!(%game_id, "leaderboard subscription ended");
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                };
                let json = match serde_json::to_string(&*update) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(%game_id, "Failed to serialize leaderboard update: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(%game_id, "WebSocket client disconnected (send failed)");
                    return;
                }
                if update.game_over {
                    debug!(%game_id, "game over, closing leaderboard stream");
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%game_id, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%game_id, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%game_id, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Clients have nothing to say on this stream.
                    }
                }
            }
        }
    }
}
