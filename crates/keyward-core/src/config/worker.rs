//! Background scheduler configuration.

use serde::{Deserialize, Serialize};

/// Periodic job configuration. Schedules use six-field cron syntax
/// (seconds first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Schedule for the expired-token and blacklist sweep.
    #[serde(default = "default_session_sweep")]
    pub session_sweep_cron: String,
    /// Schedule for the active-key rotation check.
    #[serde(default = "default_key_rotation")]
    pub key_rotation_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_sweep_cron: default_session_sweep(),
            key_rotation_cron: default_key_rotation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_session_sweep() -> String {
    "0 */5 * * * *".to_string()
}

fn default_key_rotation() -> String {
    "0 0 * * * *".to_string()
}
