//! Scheduled replacement of the active RSA key ahead of its expiry.

use std::sync::Arc;

use serde_json::Value;
use tracing;

use keyward_core::result::AppResult;
use keyward_crypto::KeyManager;

/// Rotates the active key once it is within the configured lead time of
/// expiring, or when there is no active key at all.
#[derive(Debug, Clone)]
pub struct KeyRotationJob {
    key_manager: Arc<KeyManager>,
}

impl KeyRotationJob {
    pub fn new(key_manager: Arc<KeyManager>) -> Self {
        Self { key_manager }
    }

    pub async fn run(&self) -> AppResult<Value> {
        let rotated = self.key_manager.rotate_if_due().await?;

        if let Some(key) = &rotated {
            tracing::info!(
                key_id = %key.key_id,
                version = key.version,
                expires = %key.expire_time,
                "Active key rotated by schedule"
            );
        }

        Ok(serde_json::json!({
            "task": "key_rotation",
            "rotated": rotated.is_some(),
            "key_id": rotated.map(|k| k.key_id),
        }))
    }
}
