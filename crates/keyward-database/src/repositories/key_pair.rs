//! Key pair repository.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::key_pair::RsaKeyPair;

/// Persistence operations the key manager depends on.
#[async_trait]
pub trait KeyPairRepository: Send + Sync + Debug + 'static {
    /// Find a key pair by id, active or not.
    async fn find_by_id(&self, key_id: &str) -> AppResult<Option<RsaKeyPair>>;

    /// Find the most recently created active key pair.
    async fn find_active(&self) -> AppResult<Option<RsaKeyPair>>;

    /// List every retained key pair, newest version first.
    async fn find_all(&self) -> AppResult<Vec<RsaKeyPair>>;

    /// Insert or replace a key pair.
    async fn save(&self, key: &RsaKeyPair) -> AppResult<()>;

    /// Clear the active flag on every key pair. Returns how many changed.
    async fn deactivate_all(&self) -> AppResult<u64>;

    /// Atomically increment the usage counter and stamp the last-used time.
    async fn record_usage(&self, key_id: &str, used_at: DateTime<Utc>) -> AppResult<()>;

    /// Returns the version to assign to the next generated key.
    async fn next_version(&self) -> AppResult<i64>;

    /// Physically delete a key pair. Returns `true` if it existed.
    async fn delete(&self, key_id: &str) -> AppResult<bool>;
}

/// In-process key pair repository backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryKeyPairRepository {
    keys: DashMap<String, RsaKeyPair>,
}

impl MemoryKeyPairRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retained key pairs.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when no key pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyPairRepository for MemoryKeyPairRepository {
    async fn find_by_id(&self, key_id: &str) -> AppResult<Option<RsaKeyPair>> {
        Ok(self.keys.get(key_id).map(|entry| entry.value().clone()))
    }

    async fn find_active(&self) -> AppResult<Option<RsaKeyPair>> {
        Ok(self
            .keys
            .iter()
            .filter(|entry| entry.is_active)
            .max_by_key(|entry| (entry.created_at, entry.version))
            .map(|entry| entry.value().clone()))
    }

    async fn find_all(&self) -> AppResult<Vec<RsaKeyPair>> {
        let mut keys: Vec<RsaKeyPair> = self.keys.iter().map(|e| e.value().clone()).collect();
        keys.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(keys)
    }

    async fn save(&self, key: &RsaKeyPair) -> AppResult<()> {
        self.keys.insert(key.key_id.clone(), key.clone());
        debug!(key_id = %key.key_id, active = key.is_active, "Key pair saved");
        Ok(())
    }

    async fn deactivate_all(&self) -> AppResult<u64> {
        let mut changed = 0u64;
        for mut entry in self.keys.iter_mut() {
            if entry.is_active {
                entry.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn record_usage(&self, key_id: &str, used_at: DateTime<Utc>) -> AppResult<()> {
        let mut entry = self
            .keys
            .get_mut(key_id)
            .ok_or_else(|| AppError::key_not_found(key_id))?;
        entry.usage_count += 1;
        entry.last_used_time = Some(used_at);
        Ok(())
    }

    async fn next_version(&self) -> AppResult<i64> {
        let max = self.keys.iter().map(|e| e.version).max().unwrap_or(0);
        Ok(max + 1)
    }

    async fn delete(&self, key_id: &str) -> AppResult<bool> {
        Ok(self.keys.remove(key_id).is_some())
    }
}
