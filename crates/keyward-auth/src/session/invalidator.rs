//! Immediate and delayed revocation of a user's sessions.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::store::SessionStore;

/// Revokes all sessions of a username, now or after a delay.
#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    store: Arc<SessionStore>,
}

impl SessionInvalidator {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Revokes every session of `username` once `delay` has elapsed.
    ///
    /// Fire and forget: the task cannot be cancelled. Must be called from
    /// within a Tokio runtime.
    pub fn schedule_invalidation(&self, username: &str, delay: Duration) {
        let store = Arc::clone(&self.store);
        let username = username.to_string();

        info!(
            username = %username,
            delay_ms = delay.as_millis() as u64,
            "Session invalidation scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let revoked = store.clear_user_tokens(&username);
            info!(username = %username, revoked = revoked, "Scheduled session invalidation ran");
        });
    }

    /// Revokes every session of `username` now. Returns the number revoked.
    pub fn invalidate_now(&self, username: &str) -> usize {
        self.store.clear_user_tokens(username)
    }

    /// Returns `true` if `username` has at least one cached session.
    pub fn has_active_sessions(&self, username: &str) -> bool {
        self.store.has_tokens_for_username(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use keyward_core::config::SessionConfig;
    use keyward_entity::session::TokenInfo;

    fn setup() -> (Arc<SessionStore>, SessionInvalidator) {
        let store = Arc::new(SessionStore::new(&SessionConfig::default()));
        store.put(
            "tok",
            TokenInfo::new(5, "frank", Utc::now() + chrono::Duration::hours(1)),
        );
        let invalidator = SessionInvalidator::new(Arc::clone(&store));
        (store, invalidator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_invalidation_waits_for_delay() {
        let (store, invalidator) = setup();

        invalidator.schedule_invalidation("frank", Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(invalidator.has_active_sessions("frank"));
        assert!(store.get("tok").is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!invalidator.has_active_sessions("frank"));
        assert!(store.is_blacklisted("tok"));
    }

    #[tokio::test]
    async fn test_invalidate_now() {
        let (store, invalidator) = setup();
        assert_eq!(invalidator.invalidate_now("frank"), 1);
        assert!(store.get("tok").is_none());
        assert_eq!(invalidator.invalidate_now("frank"), 0);
    }
}
