//! Error types for the server binary.
//!
//! [`ServerError`] is the top-level error that wraps every failure mode
//! during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: trivia_core::ConfigError,
    },

    /// The question catalog is missing or malformed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: trivia_core::CatalogError,
    },

    /// The game API failed to bind or stopped with an error.
    #[error("api error: {source}")]
    Api {
        /// The underlying server error.
        #[from]
        source: trivia_api::ServerError,
    },

    /// The server task panicked or was cancelled.
    #[error("server task failed: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },
}
