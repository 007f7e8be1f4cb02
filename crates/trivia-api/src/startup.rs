//! Game API server lifecycle.
//!
//! [`bind`] resolves and binds the configured address. [`serve`] runs the
//! router on an already-bound listener until a shutdown future resolves.
//! [`spawn_server`] binds up front, so a bad address or a taken port is
//! reported to the caller, then serves on a background Tokio task until
//! `Ctrl-C`.

use std::future::Future;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Listening address of the game API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 50055,
        }
    }
}

impl ServerConfig {
    /// The configured host and port as a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidAddress`] if the host is not an IP
    /// address.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|source| ServerError::InvalidAddress { address, source })
    }
}

/// Errors that can occur when starting or running the game API server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured host and port do not form a socket address.
    #[error("invalid listen address {address}: {source}")]
    InvalidAddress {
        /// The rejected `host:port` string.
        address: String,
        /// The underlying parse error.
        source: AddrParseError,
    },

    /// The TCP listener could not be bound.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server hit a fatal I/O error while serving.
    #[error("serve error: {source}")]
    Serve {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Bind a TCP listener on the configured address.
///
/// # Errors
///
/// Returns [`ServerError::InvalidAddress`] or [`ServerError::Bind`].
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the game API on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server fails while accepting
/// connections.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Game API server listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Game API server stopped");
    Ok(())
}

/// Bind the configured address and serve on a background task until
/// `Ctrl-C`. The task's result is the server's exit status.
///
/// # Errors
///
/// Returns [`ServerError::InvalidAddress`] or [`ServerError::Bind`] if the
/// listener cannot be set up.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<Result<(), ServerError>>, ServerError> {
    let listener = bind(config).await?;

    let handle = tokio::spawn(async move {
        let result = serve(listener, state, ctrl_c()).await;
        if let Err(e) = &result {
            error!(error = %e, "Game API server exited with error");
        }
        result
    });

    Ok(handle)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
