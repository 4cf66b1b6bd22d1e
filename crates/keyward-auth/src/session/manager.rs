//! Session lifecycle: login, request authentication, renewal and logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::session::{IssuedToken, Principal, TokenInfo};

use crate::jwt::TokenIssuer;
use crate::password::PasswordHasher;

use super::store::SessionStore;

/// Successor handed out for a token inside its renewal window.
#[derive(Debug, Clone)]
struct Renewal {
    /// Expiry of the presented token; the entry is useless after it.
    presented_expires: DateTime<Utc>,
    successor: IssuedToken,
}

/// Ties password verification, token issuance and the session cache together.
#[derive(Debug, Clone)]
pub struct SessionManager {
    issuer: Arc<TokenIssuer>,
    store: Arc<SessionStore>,
    hasher: Arc<PasswordHasher>,
    /// Presented token → the successor already issued for it.
    renewals: Arc<DashMap<String, Renewal>>,
}

impl SessionManager {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        store: Arc<SessionStore>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            issuer,
            store,
            hasher,
            renewals: Arc::new(DashMap::new()),
        }
    }

    /// Verifies `candidate_password` for `principal` and opens a session.
    ///
    /// Fails with `Authentication` on mismatch.
    pub async fn login(
        &self,
        principal: &Principal,
        candidate_password: &str,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> AppResult<IssuedToken> {
        let hasher = Arc::clone(&self.hasher);
        let candidate = candidate_password.to_string();
        let stored = principal.password_hash.clone();

        let matches = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?;

        if !matches {
            warn!(username = %principal.username, "Login failed: invalid credentials");
            return Err(AppError::authentication("Invalid username or password"));
        }

        let issued = self.establish(principal, device_info, ip_address)?;
        info!(
            user_id = principal.user_id,
            username = %principal.username,
            "User logged in"
        );
        Ok(issued)
    }

    /// Issues and caches a token for an already authenticated principal.
    pub fn establish(
        &self,
        principal: &Principal,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> AppResult<IssuedToken> {
        let issued = self.issuer.issue(principal.user_id, &principal.username)?;
        let info = TokenInfo::new(principal.user_id, &principal.username, issued.expire_time())
            .with_roles(principal.roles.iter().cloned())
            .with_device_info(device_info)
            .with_ip_address(ip_address);
        self.store.put(&issued.token, info);
        Ok(issued)
    }

    /// Resolves a bearer token to its session; `None` means anonymous.
    pub fn authenticate(&self, token: &str) -> Option<TokenInfo> {
        self.authenticate_at(token, Utc::now())
    }

    /// [`authenticate`](Self::authenticate) at an explicit instant.
    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenInfo> {
        let info = self.store.get_at(token, now)?;
        match self.issuer.validate_at(token, now) {
            Ok(claims) if claims.user_id() == info.user_id => Some(info),
            Ok(claims) => {
                warn!(
                    cached_user_id = info.user_id,
                    claimed_user_id = claims.user_id(),
                    "Token subject does not match cached session"
                );
                None
            }
            Err(e) => {
                debug!(error = %e, "Cached token failed validation");
                None
            }
        }
    }

    /// Issues and caches a successor when `token` is close to expiry.
    ///
    /// The presented token stays valid until its own expiry. A token gets at
    /// most one live successor; later calls hand the same one back.
    pub fn renew_if_expiring(&self, token: &str) -> Option<IssuedToken> {
        self.renew_if_expiring_at(token, Utc::now())
    }

    /// [`renew_if_expiring`](Self::renew_if_expiring) at an explicit instant.
    pub fn renew_if_expiring_at(&self, token: &str, now: DateTime<Utc>) -> Option<IssuedToken> {
        if !self.issuer.is_expiring_soon_at(token, now) {
            return None;
        }
        let info = self.store.get_at(token, now)?;

        if let Some(previous) = self.live_successor(token, now) {
            return Some(previous);
        }

        let issued = match self.issuer.refresh_at(token, now) {
            Ok(issued) => issued,
            Err(e) => {
                warn!(user_id = info.user_id, error = %e, "Token renewal failed");
                return None;
            }
        };

        let presented_expires = info.expire_time;
        let renewed = TokenInfo {
            expire_time: issued.expire_time(),
            create_time: now,
            ..info
        };
        debug!(user_id = renewed.user_id, "Token renewed");
        self.store.put(&issued.token, renewed);

        self.renewals.retain(|_, renewal| renewal.presented_expires > now);
        self.renewals.insert(
            token.to_string(),
            Renewal {
                presented_expires,
                successor: issued.clone(),
            },
        );
        Some(issued)
    }

    /// Revokes `token` and any successor issued for it.
    ///
    /// Returns `true` if `token` was an active session.
    pub fn logout(&self, token: &str) -> bool {
        let revoked = self.store.add_to_blacklist(token);
        if let Some((_, renewal)) = self.renewals.remove(token) {
            self.store.add_to_blacklist(&renewal.successor.token);
        }
        if revoked {
            info!("User logged out");
        }
        revoked
    }

    /// Number of remembered successors.
    pub fn pending_renewals(&self) -> usize {
        self.renewals.len()
    }

    fn live_successor(&self, token: &str, now: DateTime<Utc>) -> Option<IssuedToken> {
        let successor = self.renewals.get(token)?.successor.clone();
        if self.store.get_at(&successor.token, now).is_some() {
            Some(successor)
        } else {
            self.renewals.remove(token);
            None
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }
}
