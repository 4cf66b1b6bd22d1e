//! Request DTOs.

use serde::Deserialize;

use keyward_crypto::field_policies;

/// Login request. The password arrives encrypted with the advertised public key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub key_id: Option<String>,
}

field_policies!(LoginRequest {
    "password" => required,
});

/// Query parameters for session invalidation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateParams {
    /// Revoke after this many seconds instead of immediately.
    pub delay_seconds: Option<u64>,
}
