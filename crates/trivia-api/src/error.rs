//! Error types for the game API layer.
//!
//! [`ApiError`] unifies engine failures and malformed request bodies into
//! a single enum that converts into an Axum HTTP response with a JSON
//! body via its [`IntoResponse`](axum::response::IntoResponse)
//! implementation.

use axum::extract::rejection::JsonRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use trivia_core::{EngineError, ErrorKind};

/// Errors that can occur in the game API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The request body was missing, not JSON, or did not match the schema.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// A streaming route was requested without a valid `WebSocket` upgrade.
    #[error("websocket upgrade required: {0}")]
    Upgrade(#[from] WebSocketUpgradeRejection),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Engine(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            },
            Self::InvalidBody(rejection) => rejection.status(),
            Self::Upgrade(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
