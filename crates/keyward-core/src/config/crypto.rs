//! RSA key management configuration.

use serde::{Deserialize, Serialize};

/// Key sizes accepted by the key manager.
pub const ALLOWED_KEY_SIZES: [usize; 3] = [1024, 2048, 4096];

/// RSA key lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Modulus size in bits for lazily generated and rotated keys.
    #[serde(default = "default_key_size")]
    pub default_key_size: usize,
    /// Validity period of a newly generated key, in days.
    #[serde(default = "default_validity_days")]
    pub key_validity_days: u64,
    /// The rotation job replaces the active key this many hours before it expires.
    #[serde(default = "default_rotation_lead")]
    pub rotation_lead_hours: u64,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            default_key_size: default_key_size(),
            key_validity_days: default_validity_days(),
            rotation_lead_hours: default_rotation_lead(),
        }
    }
}

fn default_key_size() -> usize {
    2048
}

fn default_validity_days() -> u64 {
    90
}

fn default_rotation_lead() -> u64 {
    24
}
