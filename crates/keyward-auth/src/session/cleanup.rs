//! Periodic sweep of expired sessions and stale blacklist entries.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::store::SessionStore;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    /// Expired tokens evicted from the cache.
    pub expired_tokens: usize,
    /// Blacklist entries past their own expiry.
    pub blacklist_purged: usize,
}

impl SweepResult {
    pub fn is_empty(&self) -> bool {
        self.expired_tokens == 0 && self.blacklist_purged == 0
    }
}

/// Runs cleanup cycles against a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    store: Arc<SessionStore>,
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Evicts expired tokens, then drops blacklist entries past their expiry.
    pub fn run_sweep(&self) -> SweepResult {
        let result = SweepResult {
            expired_tokens: self.store.clean_expired_tokens(),
            blacklist_purged: self.store.clean_blacklist(),
        };

        if !result.is_empty() {
            info!(
                expired_tokens = result.expired_tokens,
                blacklist_purged = result.blacklist_purged,
                "Session sweep completed"
            );
        }
        result
    }
}
