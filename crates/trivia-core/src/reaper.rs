//! Background eviction of finished games.
//!
//! Completed sessions are kept for `game.completed_retention_seconds` so
//! late readers can still fetch the final leaderboard, then dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::TriviaEngine;

/// Spawn the reaper on the current Tokio runtime.
///
/// Returns `None` without spawning when retention is unlimited. The task
/// runs until aborted or the runtime shuts down.
pub fn spawn_reaper(engine: Arc<TriviaEngine>) -> Option<JoinHandle<()>> {
    let retention = engine.config().completed_retention()?;
    let period = engine.config().reap_interval();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = engine.evict_expired();
            if evicted > 0 {
                info!(evicted, remaining = engine.game_count(), "reaped completed games");
            } else {
                debug!(games = engine.game_count(), "reaper pass, nothing expired");
            }
        }
    });

    info!(
        retention_secs = retention.as_secs(),
        interval_secs = period.as_secs(),
        "session reaper spawned"
    );
    Some(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::QuestionCatalog;
    use crate::config::GameConfig;

    const CATALOG: &str = r#"[
        {"question_id": "q1", "question_text": "Pick B", "options": ["A", "B"], "correct_option": "B"}
    ]"#;

    fn engine(config: GameConfig) -> Arc<TriviaEngine> {
        Arc::new(TriviaEngine::new(QuestionCatalog::parse(CATALOG).unwrap(), config))
    }

    #[tokio::test]
    async fn unlimited_retention_spawns_nothing() {
        let config = GameConfig {
            completed_retention_seconds: 0,
            ..GameConfig::default()
        };
        assert!(spawn_reaper(engine(config)).is_none());
    }

    #[tokio::test]
    async fn reaper_leaves_running_games_alone() {
        let config = GameConfig {
            completed_retention_seconds: 1,
            reap_interval_seconds: 1,
            ..GameConfig::default()
        };
        let engine = engine(config);
        engine.join(Some("g1"), "ann").unwrap();

        let handle = spawn_reaper(Arc::clone(&engine)).unwrap();
        // The first tick fires immediately.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(engine.game_count(), 1);
        handle.abort();
    }
}
