//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `trivia-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, with a
//! default for every field so a partial (or absent) file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TriviaConfig {
    /// Listening address of the game API.
    #[serde(default)]
    pub server: ServerSection,

    /// Question catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Game rules and session housekeeping.
    #[serde(default)]
    pub game: GameConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TriviaConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are not applied here; call
    /// [`apply_env_overrides`](Self::apply_env_overrides) once logging is up
    /// so rejected values can be reported.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `TRIVIA_*` environment overrides.
    ///
    /// - `TRIVIA_HOST` overrides `server.host`
    /// - `TRIVIA_PORT` overrides `server.port`
    /// - `TRIVIA_CATALOG_PATH` overrides `catalog.path`
    ///
    /// Values that cannot be applied are returned rather than logged.
    #[must_use]
    pub fn apply_env_overrides(&mut self) -> Vec<RejectedOverride> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment.
    #[must_use]
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Vec<RejectedOverride> {
        let mut rejected = Vec::new();
        if let Some(val) = lookup("TRIVIA_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("TRIVIA_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => rejected.push(RejectedOverride {
                    variable: "TRIVIA_PORT",
                    value: val,
                    reason: e.to_string(),
                }),
            }
        }
        if let Some(val) = lookup("TRIVIA_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(val);
        }
        rejected
    }
}

/// An environment override that was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    /// Variable name.
    pub variable: &'static str,
    /// Raw value found in the environment.
    pub value: String,
    /// Why it could not be applied.
    pub reason: String,
}

/// Listening address of the game API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Question catalog location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Path to the JSON question file.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Game rules and session housekeeping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Points awarded for a correct answer.
    #[serde(default = "default_points_per_correct")]
    pub points_per_correct: u32,

    /// Advisory per-question time shown on question cards.
    #[serde(default = "default_time_limit_seconds")]
    pub time_limit_seconds: u32,

    /// Capacity of each subscriber's update queue. A subscriber whose
    /// queue is full when an update is pushed is dropped.
    #[serde(default = "default_listener_capacity")]
    pub listener_capacity: usize,

    /// How long a completed session is kept before eviction (0 = forever).
    #[serde(default = "default_completed_retention_seconds")]
    pub completed_retention_seconds: u64,

    /// How often the reaper looks for expired sessions.
    #[serde(default = "default_reap_interval_seconds")]
    pub reap_interval_seconds: u64,
}

impl GameConfig {
    /// Retention window for completed sessions, `None` when unlimited.
    pub const fn completed_retention(&self) -> Option<Duration> {
        if self.completed_retention_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.completed_retention_seconds))
        }
    }

    /// Reaper tick period, never shorter than one second.
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_seconds.max(1))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            points_per_correct: default_points_per_correct(),
            time_limit_seconds: default_time_limit_seconds(),
            listener_capacity: default_listener_capacity(),
            completed_retention_seconds: default_completed_retention_seconds(),
            reap_interval_seconds: default_reap_interval_seconds(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Whether JSON log output was requested.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    50055
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/questions.json")
}

const fn default_points_per_correct() -> u32 {
    10
}

const fn default_time_limit_seconds() -> u32 {
    10
}

const fn default_listener_capacity() -> usize {
    64
}

const fn default_completed_retention_seconds() -> u64 {
    600
}

const fn default_reap_interval_seconds() -> u64 {
    60
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}
