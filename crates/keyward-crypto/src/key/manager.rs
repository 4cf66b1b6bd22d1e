//! RSA key manager: generation, rotation, decryption and usage tracking.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use keyward_core::config::CryptoConfig;
use keyward_core::config::crypto::ALLOWED_KEY_SIZES;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_database::KeyPairRepository;
use keyward_entity::key_pair::model::RSA_ALGORITHM;
use keyward_entity::key_pair::{PublicKeyInfo, RsaKeyPair};

use crate::rsa::codec::{self, KeyMaterial};

/// Description stamped on keys created by the lazy path.
const AUTO_DESCRIPTION: &str = "Automatically generated active key";

/// Parameters for an explicit key generation.
#[derive(Debug, Clone)]
pub struct KeyGenerationRequest {
    /// Modulus size in bits; `None` uses the configured default.
    pub key_size: Option<usize>,
    /// Validity period; `None` uses the configured default.
    pub expires_in: Option<Duration>,
    /// Operator description.
    pub description: String,
    /// Whether the new key replaces the current active key.
    pub set_active: bool,
}

impl KeyGenerationRequest {
    /// A request for a key that becomes the active key.
    pub fn active(description: impl Into<String>) -> Self {
        Self {
            key_size: None,
            expires_in: None,
            description: description.into(),
            set_active: true,
        }
    }

    /// A request for a standby key that is stored inactive.
    pub fn inactive(description: impl Into<String>) -> Self {
        Self {
            set_active: false,
            ..Self::active(description)
        }
    }

    /// Overrides the modulus size.
    pub fn with_key_size(mut self, bits: usize) -> Self {
        self.key_size = Some(bits);
        self
    }

    /// Overrides the validity period.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

/// Serves the single active RSA key and decrypts with any retained key.
///
/// Every path that may activate a key runs under `generation_lock`, so at
/// most one key is active and concurrent first callers share one
/// generated key.
pub struct KeyManager {
    repo: Arc<dyn KeyPairRepository>,
    config: CryptoConfig,
    generation_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("config", &self.config)
            .finish()
    }
}

impl KeyManager {
    /// Creates a key manager over the given repository.
    pub fn new(repo: Arc<dyn KeyPairRepository>, config: CryptoConfig) -> Self {
        Self {
            repo,
            config,
            generation_lock: Mutex::new(()),
        }
    }

    /// Returns the current active, non-expired key, generating one if needed.
    pub async fn get_active_key(&self) -> AppResult<RsaKeyPair> {
        if let Some(key) = self.repo.find_active().await? {
            if !key.is_expired() {
                return Ok(key);
            }
        }

        let _guard = self.generation_lock.lock().await;

        // Another caller may have generated while we waited.
        match self.repo.find_active().await? {
            Some(key) if !key.is_expired() => return Ok(key),
            Some(key) => {
                warn!(key_id = %key.key_id, expired_at = %key.expire_time, "Active key expired, rotating");
            }
            None => info!("No active key pair found, generating one"),
        }

        self.generate_locked(KeyGenerationRequest::active(AUTO_DESCRIPTION))
            .await
    }

    /// Generates and persists a new key pair.
    ///
    /// With `set_active`, every other key is deactivated before the new key
    /// is stored as active.
    pub async fn generate_key_pair(&self, request: KeyGenerationRequest) -> AppResult<RsaKeyPair> {
        let _guard = self.generation_lock.lock().await;
        self.generate_locked(request).await
    }

    /// Replaces the active key with a freshly generated one.
    pub async fn rotate(&self, description: impl Into<String>) -> AppResult<RsaKeyPair> {
        self.generate_key_pair(KeyGenerationRequest::active(description))
            .await
    }

    /// Rotates when the active key is missing or expires within the
    /// configured lead time. Returns the new key if one was generated.
    pub async fn rotate_if_due(&self) -> AppResult<Option<RsaKeyPair>> {
        let lead = Duration::hours(self.config.rotation_lead_hours as i64);
        let _guard = self.generation_lock.lock().await;

        if !self.rotation_due(lead).await? {
            debug!("Active key not yet due for rotation");
            return Ok(None);
        }
        info!(lead_hours = self.config.rotation_lead_hours, "Active key due for rotation");

        let key = self
            .generate_locked(KeyGenerationRequest::active("Scheduled rotation"))
            .await?;
        Ok(Some(key))
    }

    /// Returns `true` when there is no active key or it expires within `lead`.
    pub async fn rotation_due(&self, lead: Duration) -> AppResult<bool> {
        Ok(match self.repo.find_active().await? {
            Some(key) => key.expire_time - lead <= Utc::now(),
            None => true,
        })
    }

    /// Decrypts base64 ciphertext with the key identified by `key_id`.
    ///
    /// Inactive keys still decrypt. Each success increments the key's
    /// usage counter and stamps its last-used time. The private-key work
    /// runs on the blocking pool.
    pub async fn decrypt(&self, key_id: &str, ciphertext_b64: &str) -> AppResult<String> {
        let key = self
            .repo
            .find_by_id(key_id)
            .await?
            .ok_or_else(|| AppError::key_not_found(key_id))?;

        let private_key = key.private_key;
        let ciphertext = ciphertext_b64.to_string();
        let plaintext = tokio::task::spawn_blocking(move || {
            codec::decrypt_with_private_key(&private_key, &ciphertext)
        })
        .await
        .map_err(|e| AppError::internal(format!("Decryption task failed: {e}")))??;

        self.repo.record_usage(key_id, Utc::now()).await?;
        debug!(key_id = %key_id, "Ciphertext decrypted");
        Ok(plaintext)
    }

    /// Encrypts `plaintext` with the public half of `key_id`.
    pub async fn encrypt(&self, key_id: &str, plaintext: &str) -> AppResult<String> {
        let key = self
            .repo
            .find_by_id(key_id)
            .await?
            .ok_or_else(|| AppError::key_not_found(key_id))?;
        codec::encrypt_with_public_key(&key.public_key, plaintext)
    }

    /// Returns the public half of the active key.
    pub async fn public_key(&self) -> AppResult<PublicKeyInfo> {
        Ok(self.get_active_key().await?.public_info())
    }

    /// Looks up the public half of a retained key.
    pub async fn find_key(&self, key_id: &str) -> AppResult<PublicKeyInfo> {
        self.repo
            .find_by_id(key_id)
            .await?
            .map(|key| key.public_info())
            .ok_or_else(|| AppError::key_not_found(key_id))
    }

    /// Lists the public halves of all retained keys, newest first.
    pub async fn list_keys(&self) -> AppResult<Vec<PublicKeyInfo>> {
        Ok(self
            .repo
            .find_all()
            .await?
            .iter()
            .map(RsaKeyPair::public_info)
            .collect())
    }

    /// Permanently deletes an inactive key. Ciphertext under it becomes
    /// undecryptable.
    pub async fn purge_key(&self, key_id: &str) -> AppResult<()> {
        let _guard = self.generation_lock.lock().await;

        let key = self
            .repo
            .find_by_id(key_id)
            .await?
            .ok_or_else(|| AppError::key_not_found(key_id))?;

        if key.is_active {
            return Err(AppError::conflict(format!(
                "Key pair '{key_id}' is active and cannot be purged"
            )));
        }

        self.repo.delete(key_id).await?;
        info!(key_id = %key_id, version = key.version, "Key pair purged");
        Ok(())
    }

    async fn generate_locked(&self, request: KeyGenerationRequest) -> AppResult<RsaKeyPair> {
        let key_size = request.key_size.unwrap_or(self.config.default_key_size);
        if !ALLOWED_KEY_SIZES.contains(&key_size) {
            return Err(AppError::validation(format!(
                "Unsupported RSA key size {key_size}; expected one of {ALLOWED_KEY_SIZES:?}"
            )));
        }

        let expires_in = request
            .expires_in
            .unwrap_or_else(|| Duration::days(self.config.key_validity_days as i64));
        if expires_in <= Duration::zero() {
            return Err(AppError::validation("Key validity period must be positive"));
        }

        let started = std::time::Instant::now();
        let material = tokio::task::spawn_blocking(move || {
            let material = KeyMaterial::generate(key_size)?;
            material.verify_round_trip()?;
            Ok::<_, AppError>(material)
        })
        .await
        .map_err(|e| AppError::internal(format!("Key generation task failed: {e}")))??;

        let now = Utc::now();
        let mut key = RsaKeyPair {
            key_id: RsaKeyPair::new_key_id(),
            public_key: material.public_key.clone(),
            private_key: material.private_key.to_string(),
            key_size,
            algorithm: RSA_ALGORITHM.to_string(),
            version: self.repo.next_version().await?,
            is_active: false,
            expire_time: now + expires_in,
            last_used_time: None,
            usage_count: 0,
            description: request.description,
            created_at: now,
        };

        if request.set_active {
            let deactivated = self.repo.deactivate_all().await?;
            key.is_active = true;
            debug!(deactivated, "Previous active keys deactivated");
        }

        self.repo.save(&key).await?;

        info!(
            key_id = %key.key_id,
            key_size,
            version = key.version,
            active = key.is_active,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "RSA key pair generated"
        );

        Ok(key)
    }
}
