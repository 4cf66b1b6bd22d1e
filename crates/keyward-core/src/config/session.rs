//! Session store configuration.

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a blacklist entry is kept when the token's own expiry is
    /// unknown, in seconds. Must exceed the token TTL.
    #[serde(default = "default_blacklist_retention")]
    pub blacklist_retention_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            blacklist_retention_seconds: default_blacklist_retention(),
        }
    }
}

fn default_blacklist_retention() -> u64 {
    86_400
}
