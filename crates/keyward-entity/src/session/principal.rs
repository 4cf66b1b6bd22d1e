//! Authenticating principal as supplied by the caller's user lookup.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A user record reduced to what session establishment needs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    /// Stored one-way hash of the user's password.
    pub password_hash: String,
    pub roles: BTreeSet<String>,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish()
    }
}
