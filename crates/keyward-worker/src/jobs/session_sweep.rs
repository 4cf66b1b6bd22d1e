//! Expired token and blacklist sweep.

use serde_json::Value;
use tracing;

use keyward_auth::SessionSweeper;

/// Runs one [`SessionSweeper`] cycle per tick.
#[derive(Debug, Clone)]
pub struct SessionSweepJob {
    sweeper: SessionSweeper,
}

impl SessionSweepJob {
    pub fn new(sweeper: SessionSweeper) -> Self {
        Self { sweeper }
    }

    /// Runs the sweep and returns a summary for logging.
    pub fn run(&self) -> Value {
        tracing::debug!("Running session sweep");
        let result = self.sweeper.run_sweep();

        serde_json::json!({
            "task": "session_sweep",
            "expired_tokens_removed": result.expired_tokens,
            "blacklist_entries_removed": result.blacklist_purged,
        })
    }
}
