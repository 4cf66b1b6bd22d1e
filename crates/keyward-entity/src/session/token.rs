//! Cached token metadata and issuance results.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token type advertised to clients.
pub const BEARER: &str = "Bearer";

/// Metadata cached for an issued bearer token.
///
/// Immutable once created; a renewed token gets its own `TokenInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub user_id: i64,
    pub username: String,
    pub expire_time: DateTime<Utc>,
    pub roles: BTreeSet<String>,
    pub create_time: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

impl TokenInfo {
    /// Creates token metadata with no roles or client details.
    pub fn new(user_id: i64, username: impl Into<String>, expire_time: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: username.into(),
            expire_time,
            roles: BTreeSet::new(),
            create_time: Utc::now(),
            device_info: None,
            ip_address: None,
        }
    }

    /// Sets the role set.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the client device description.
    pub fn with_device_info(mut self, device_info: Option<String>) -> Self {
        self.device_info = device_info;
        self
    }

    /// Sets the client IP address.
    pub fn with_ip_address(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }

    /// Returns `true` if the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_time
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns `true` if the role set contains `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Result of a successful token issuance, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// The signed bearer token.
    pub token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Expiry as epoch milliseconds.
    pub expires_at: i64,
}

impl IssuedToken {
    /// Wraps a freshly signed bearer token.
    pub fn bearer(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            token_type: BEARER.to_string(),
            expires_at: expires_at.timestamp_millis(),
        }
    }

    /// Returns the expiry as a `DateTime<Utc>`.
    pub fn expire_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.expires_at).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_builder_sets_optional_fields() {
        let info = TokenInfo::new(42, "alice", Utc::now() + Duration::minutes(30))
            .with_roles(["admin", "user"])
            .with_device_info(Some("firefox".to_string()))
            .with_ip_address(Some("10.0.0.1".to_string()));

        assert!(info.has_role("admin"));
        assert!(!info.has_role("guest"));
        assert_eq!(info.device_info.as_deref(), Some("firefox"));
        assert!(!info.is_expired());
    }

    #[test]
    fn test_issued_token_wire_format() {
        let expire = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let issued = IssuedToken::bearer("abc".to_string(), expire);
        let json = serde_json::to_value(&issued).unwrap();

        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresAt"], 1_700_000_000_000i64);
        assert_eq!(issued.expire_time(), expire);
    }
}
