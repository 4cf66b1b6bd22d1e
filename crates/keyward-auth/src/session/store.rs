//! In-memory session cache with secondary indexes and an expiring blacklist.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use keyward_core::config::SessionConfig;
use keyward_entity::session::TokenInfo;

/// Point-in-time counters for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Cached tokens.
    pub active_tokens: usize,
    /// Distinct user ids with at least one cached token.
    pub active_users: usize,
    /// Blacklist entries not yet swept.
    pub blacklisted_tokens: usize,
}

/// Caches issued tokens and tracks revoked ones.
///
/// The token map is authoritative; the per-user and per-username indexes
/// only accelerate bulk revocation. Bulk revocation holds the write side of
/// `revocation_gate` so no `get` observes a half-revoked identity.
#[derive(Debug)]
pub struct SessionStore {
    tokens: DashMap<String, TokenInfo>,
    by_user_id: DashMap<i64, HashSet<String>>,
    by_username: DashMap<String, HashSet<String>>,
    /// Revoked token → instant after which the entry may be dropped.
    blacklist: DashMap<String, DateTime<Utc>>,
    revocation_gate: RwLock<()>,
    blacklist_retention: Duration,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            tokens: DashMap::new(),
            by_user_id: DashMap::new(),
            by_username: DashMap::new(),
            blacklist: DashMap::new(),
            revocation_gate: RwLock::new(()),
            blacklist_retention: Duration::seconds(config.blacklist_retention_seconds as i64),
        }
    }

    /// Caches `info` for `token` and indexes it by user id and username.
    pub fn put(&self, token: &str, info: TokenInfo) {
        let user_id = info.user_id;
        let username = info.username.clone();

        self.tokens.insert(token.to_string(), info);
        self.by_user_id
            .entry(user_id)
            .or_default()
            .insert(token.to_string());
        self.by_username
            .entry(username)
            .or_default()
            .insert(token.to_string());

        debug!(user_id = user_id, "Session cached");
    }

    /// Looks up a live, non-revoked token.
    ///
    /// Expired entries are evicted on the way out.
    pub fn get(&self, token: &str) -> Option<TokenInfo> {
        self.get_at(token, Utc::now())
    }

    /// [`get`](Self::get) at an explicit instant.
    pub fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenInfo> {
        let _gate = self.read_gate();

        if self.blacklist.contains_key(token) {
            return None;
        }

        let info = self.tokens.get(token).map(|entry| entry.value().clone())?;
        if info.is_expired_at(now) {
            if let Some((_, evicted)) = self
                .tokens
                .remove_if(token, |_, cached| cached.is_expired_at(now))
            {
                self.unindex(token, &evicted);
            }
            return None;
        }
        Some(info)
    }

    /// Drops `token` from the cache and both indexes.
    pub fn remove(&self, token: &str) -> Option<TokenInfo> {
        let (_, info) = self.tokens.remove(token)?;
        self.unindex(token, &info);
        Some(info)
    }

    /// Revokes `token`; it stays blacklisted until its own expiry.
    ///
    /// Returns `true` if the token was cached.
    pub fn add_to_blacklist(&self, token: &str) -> bool {
        let expires = self
            .tokens
            .get(token)
            .map(|entry| entry.expire_time)
            .unwrap_or_else(|| Utc::now() + self.blacklist_retention);
        self.add_to_blacklist_until(token, expires)
    }

    /// Revokes `token`, keeping the blacklist entry until `expires`.
    pub fn add_to_blacklist_until(&self, token: &str, expires: DateTime<Utc>) -> bool {
        self.blacklist.insert(token.to_string(), expires);
        self.remove(token).is_some()
    }

    /// Returns `true` if `token` has been revoked and not yet swept.
    pub fn is_blacklisted(&self, token: &str) -> bool {
        self.blacklist.contains_key(token)
    }

    /// Revokes every cached token for `user_id` as one unit.
    ///
    /// Returns the number of tokens revoked.
    pub fn kickout_user(&self, user_id: i64) -> usize {
        let _gate = self.write_gate();
        let Some((_, tokens)) = self.by_user_id.remove(&user_id) else {
            return 0;
        };
        let revoked = self.revoke_all(&tokens);
        info!(user_id = user_id, revoked = revoked, "User sessions kicked out");
        revoked
    }

    /// Revokes every cached token for `username` as one unit.
    ///
    /// Returns the number of tokens revoked.
    pub fn clear_user_tokens(&self, username: &str) -> usize {
        let _gate = self.write_gate();
        let Some((_, tokens)) = self.by_username.remove(username) else {
            return 0;
        };
        let revoked = self.revoke_all(&tokens);
        info!(username = %username, revoked = revoked, "User sessions cleared");
        revoked
    }

    /// Evicts every expired cached token. Returns the number evicted.
    pub fn clean_expired_tokens(&self) -> usize {
        self.clean_expired_tokens_at(Utc::now())
    }

    /// [`clean_expired_tokens`](Self::clean_expired_tokens) at an explicit instant.
    pub fn clean_expired_tokens_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .tokens
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut evicted = 0;
        for token in expired {
            if let Some((_, info)) = self
                .tokens
                .remove_if(&token, |_, cached| cached.is_expired_at(now))
            {
                self.unindex(&token, &info);
                evicted += 1;
            }
        }
        evicted
    }

    /// Drops blacklist entries whose own expiry has passed.
    pub fn clean_blacklist(&self) -> usize {
        self.clean_blacklist_at(Utc::now())
    }

    /// [`clean_blacklist`](Self::clean_blacklist) at an explicit instant.
    pub fn clean_blacklist_at(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        self.blacklist.retain(|_, expires| {
            let keep = *expires > now;
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    /// Tokens currently indexed for `user_id`.
    pub fn tokens_for_user(&self, user_id: i64) -> Vec<String> {
        self.by_user_id
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Tokens currently indexed for `username`.
    pub fn tokens_for_username(&self, username: &str) -> Vec<String> {
        self.by_username
            .get(username)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if any token is indexed for `username`.
    pub fn has_tokens_for_username(&self, username: &str) -> bool {
        self.by_username
            .get(username)
            .is_some_and(|set| !set.is_empty())
    }

    /// Number of cached tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active_tokens: self.tokens.len(),
            active_users: self.by_user_id.len(),
            blacklisted_tokens: self.blacklist.len(),
        }
    }

    fn revoke_all(&self, tokens: &HashSet<String>) -> usize {
        let mut revoked = 0;
        for token in tokens {
            let expires = self
                .tokens
                .get(token)
                .map(|entry| entry.expire_time)
                .unwrap_or_else(|| Utc::now() + self.blacklist_retention);
            if self.add_to_blacklist_until(token, expires) {
                revoked += 1;
            }
        }
        revoked
    }

    fn unindex(&self, token: &str, info: &TokenInfo) {
        self.by_user_id.remove_if_mut(&info.user_id, |_, set| {
            set.remove(token);
            set.is_empty()
        });
        self.by_username.remove_if_mut(&info.username, |_, set| {
            set.remove(token);
            set.is_empty()
        });
    }

    fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.revocation_gate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.revocation_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
