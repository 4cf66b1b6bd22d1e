//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyward_auth::SessionStats;
use keyward_entity::session::TokenInfo;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub sessions: SessionStats,
}

/// The caller's own session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub expire_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

impl From<TokenInfo> for SessionResponse {
    fn from(info: TokenInfo) -> Self {
        Self {
            user_id: info.user_id,
            username: info.username,
            roles: info.roles.into_iter().collect(),
            expire_time: info.expire_time,
            create_time: info.create_time,
            device_info: info.device_info,
            ip_address: info.ip_address,
        }
    }
}

/// Result of a revocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationResponse {
    /// Tokens revoked now. Zero when the revocation was scheduled.
    pub revoked: usize,
    pub scheduled: bool,
}
