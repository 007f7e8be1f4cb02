//! Trivia game server binary.
//!
//! Wires together configuration, the question catalog, the session engine
//! and the game API, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `trivia-config.yaml` (or `$TRIVIA_CONFIG`)
//! 2. Initialize structured logging (tracing), then apply `TRIVIA_*`
//!    environment overrides
//! 3. Load the question catalog; any failure here is fatal
//! 4. Create the session engine
//! 5. Spawn the completed-session reaper
//! 6. Serve the game API until shutdown

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trivia_api::{AppState, ServerConfig};
use trivia_core::{QuestionCatalog, TriviaConfig, TriviaEngine};

use crate::error::ServerError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "trivia-config.yaml";

/// Application entry point for the trivia server.
///
/// # Errors
///
/// Returns an error if configuration or the catalog cannot be loaded, or
/// the API server fails to bind or serve.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let (mut config, config_found) = load_config()?;

    // 2. Initialize structured logging, then apply environment overrides.
    init_tracing(&config);
    info!("trivia-server starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    for rejected in config.apply_env_overrides() {
        warn!(
            variable = rejected.variable,
            value = %rejected.value,
            reason = %rejected.reason,
            "Ignoring invalid environment override"
        );
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        catalog = %config.catalog.path.display(),
        points_per_correct = config.game.points_per_correct,
        listener_capacity = config.game.listener_capacity,
        "Configuration loaded"
    );

    // 3. Load the question catalog.
    let catalog = QuestionCatalog::from_file(&config.catalog.path)?;
    info!(questions = catalog.len(), "Question catalog loaded");

    // 4. Create the session engine.
    let engine = Arc::new(TriviaEngine::new(catalog, config.game.clone()));

    // 5. Spawn the reaper for finished games.
    let reaper = trivia_core::spawn_reaper(Arc::clone(&engine));
    if reaper.is_none() {
        info!("Completed-game retention unlimited, reaper disabled");
    }

    // 6. Serve the game API.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(Arc::clone(&engine)));
    let server = trivia_api::spawn_server(&server_config, state).await?;

    let result = server.await.map_err(|e| ServerError::Task {
        message: format!("{e}"),
    })?;

    if let Some(reaper) = reaper {
        reaper.abort();
    }
    result?;

    info!(games = engine.game_count(), "trivia-server stopped");
    Ok(())
}

/// Load configuration from `$TRIVIA_CONFIG` or `trivia-config.yaml`.
///
/// A missing file yields defaults. Returns the config and whether a file
/// was found.
fn load_config() -> Result<(TriviaConfig, bool), ServerError> {
    let path = std::env::var("TRIVIA_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        Ok((TriviaConfig::from_file(&path)?, true))
    } else {
        Ok((TriviaConfig::default(), false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.format: json` switches
/// to JSON lines.
fn init_tracing(config: &TriviaConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
