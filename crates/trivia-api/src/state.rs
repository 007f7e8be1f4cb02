//! Shared application state for the game API server.

use std::sync::Arc;

use trivia_core::TriviaEngine;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. All
/// game state lives in the engine; handlers are thin adapters over it.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The session engine serving every game.
    pub engine: Arc<TriviaEngine>,
}

impl AppState {
    /// Create application state around an engine.
    pub const fn new(engine: Arc<TriviaEngine>) -> Self {
        Self { engine }
    }
}
