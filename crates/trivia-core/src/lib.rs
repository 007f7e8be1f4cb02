//! Game session engine for real-time multiplayer trivia.
//!
//! This crate admits players into shared games, advances every game
//! through the question catalog in lockstep, scores answers, and fans out
//! ranked leaderboard updates to any number of subscribers per game.
//!
//! # Modules
//!
//! - [`catalog`] -- Fail-fast loading of the JSON question catalog.
//! - [`config`] -- Configuration loading from `trivia-config.yaml`.
//! - [`engine`] -- [`TriviaEngine`], the operation surface.
//! - [`error`] -- [`EngineError`] and its transport-facing [`ErrorKind`].
//! - [`fanout`] -- Per-session bounded listener queues.
//! - [`leaderboard`] -- Pure leaderboard projection.
//! - [`ledger`] -- Per-question answered-player sets.
//! - [`reaper`] -- Background eviction of finished games.
//! - [`session`] -- The per-game state machine.
//! - [`store`] -- Game id to session mapping with per-session locks.
//! - [`subscription`] -- Leaderboard update streams.
//!
//! # Concurrency
//!
//! Each game has a single lock guarding all of its mutable state; games
//! never share a lock. Engine operations never block on I/O or on
//! subscribers: updates are pushed with a non-blocking send, and a
//! subscriber that cannot accept one is dropped.
//!
//! [`TriviaEngine`]: engine::TriviaEngine
//! [`EngineError`]: error::EngineError
//! [`ErrorKind`]: error::ErrorKind

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod leaderboard;
pub mod ledger;
pub mod reaper;
pub mod session;
pub mod store;
pub mod subscription;

pub use catalog::{CatalogError, QuestionCatalog};
pub use config::{ConfigError, GameConfig, RejectedOverride, TriviaConfig};
pub use engine::TriviaEngine;
pub use error::{EngineError, ErrorKind};
pub use reaper::spawn_reaper;
pub use subscription::LeaderboardSubscription;
