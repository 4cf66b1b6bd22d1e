//! RSA key pair entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Algorithm tag stored on every key pair.
pub const RSA_ALGORITHM: &str = "RSA";

/// A persisted RSA key pair.
///
/// Key material is stored as base64-encoded DER: SubjectPublicKeyInfo for
/// the public half and PKCS#8 for the private half. Records are retained
/// after rotation so ciphertext produced under an older key stays
/// decryptable until the key is purged.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaKeyPair {
    /// Opaque unique identifier (`rsa-<uuid>`).
    pub key_id: String,
    /// Base64 DER public key.
    pub public_key: String,
    /// Base64 DER PKCS#8 private key.
    pub private_key: String,
    /// Modulus size in bits.
    pub key_size: usize,
    /// Algorithm tag, always [`RSA_ALGORITHM`].
    pub algorithm: String,
    /// Monotonically increasing version across all keys.
    pub version: i64,
    /// Whether this is the key currently advertised for encryption.
    pub is_active: bool,
    /// When the key stops being served as the active key.
    pub expire_time: DateTime<Utc>,
    /// Last successful decrypt.
    pub last_used_time: Option<DateTime<Utc>>,
    /// Number of successful decrypts.
    pub usage_count: u64,
    /// Free-form operator description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl RsaKeyPair {
    /// Generates a fresh key identifier.
    pub fn new_key_id() -> String {
        format!("rsa-{}", Uuid::new_v4())
    }

    /// Returns `true` if the key has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_time
    }

    /// Returns `true` if the key has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Modulus size in bytes.
    pub fn key_bytes(&self) -> usize {
        self.key_size / 8
    }

    /// Projects the outward-facing half of the key pair.
    pub fn public_info(&self) -> PublicKeyInfo {
        PublicKeyInfo {
            key_id: self.key_id.clone(),
            public_key: self.public_key.clone(),
            key_size: self.key_size,
            algorithm: self.algorithm.clone(),
            version: self.version,
            is_active: self.is_active,
            expire_time: self.expire_time,
        }
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("key_id", &self.key_id)
            .field("key_size", &self.key_size)
            .field("version", &self.version)
            .field("is_active", &self.is_active)
            .field("expire_time", &self.expire_time)
            .field("usage_count", &self.usage_count)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Public projection of a key pair. The only key material ever exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyInfo {
    pub key_id: String,
    pub public_key: String,
    pub key_size: usize,
    pub algorithm: String,
    pub version: i64,
    pub is_active: bool,
    pub expire_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> RsaKeyPair {
        let now = Utc::now();
        RsaKeyPair {
            key_id: RsaKeyPair::new_key_id(),
            public_key: "cHVibGlj".to_string(),
            private_key: "c2VjcmV0".to_string(),
            key_size: 2048,
            algorithm: RSA_ALGORITHM.to_string(),
            version: 1,
            is_active: true,
            expire_time: now + Duration::days(1),
            last_used_time: None,
            usage_count: 0,
            description: "test".to_string(),
            created_at: now,
        }
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = sample();
        let printed = format!("{key:?}");
        assert!(!printed.contains("c2VjcmV0"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_expiry_boundary() {
        let key = sample();
        assert!(!key.is_expired_at(key.expire_time - Duration::seconds(1)));
        assert!(key.is_expired_at(key.expire_time));
    }

    #[test]
    fn test_public_info_serializes_camel_case() {
        let info = sample().public_info();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("keyId").is_some());
        assert!(json.get("publicKey").is_some());
        assert!(json.get("privateKey").is_none());
        assert_eq!(info.key_size, 2048);
    }
}
