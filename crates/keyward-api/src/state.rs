//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use keyward_auth::{
    PasswordHasher, SessionInvalidator, SessionManager, SessionStore, SessionSweeper, TokenIssuer,
};
use keyward_core::config::AppConfig;
use keyward_core::result::AppResult;
use keyward_crypto::{CryptoGateway, KeyManager};
use keyward_database::{KeyPairRepository, PrincipalRepository};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Crypto ───────────────────────────────────────────────
    pub key_manager: Arc<KeyManager>,
    pub crypto_gateway: Arc<CryptoGateway>,

    // ── Auth ─────────────────────────────────────────────────
    pub password_hasher: Arc<PasswordHasher>,
    pub session_store: Arc<SessionStore>,
    pub session_manager: Arc<SessionManager>,
    pub session_invalidator: Arc<SessionInvalidator>,

    // ── Persistence ──────────────────────────────────────────
    pub principals: Arc<dyn PrincipalRepository>,

    /// Process start, for the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    /// Wires every component from configuration and the two repositories.
    pub fn build(
        config: AppConfig,
        key_repo: Arc<dyn KeyPairRepository>,
        principals: Arc<dyn PrincipalRepository>,
    ) -> AppResult<Self> {
        let key_manager = Arc::new(KeyManager::new(key_repo, config.crypto.clone()));
        let crypto_gateway = Arc::new(CryptoGateway::new(Arc::clone(&key_manager)));

        let issuer = Arc::new(TokenIssuer::new(&config.auth)?);
        let password_hasher = Arc::new(PasswordHasher::new(&config.auth.password_hash)?);
        let session_store = Arc::new(SessionStore::new(&config.session));
        let session_manager = Arc::new(SessionManager::new(
            issuer,
            Arc::clone(&session_store),
            Arc::clone(&password_hasher),
        ));
        let session_invalidator = Arc::new(SessionInvalidator::new(Arc::clone(&session_store)));

        Ok(Self {
            config: Arc::new(config),
            key_manager,
            crypto_gateway,
            password_hasher,
            session_store,
            session_manager,
            session_invalidator,
            principals,
            started_at: Instant::now(),
        })
    }

    /// A sweeper over this state's session store.
    pub fn session_sweeper(&self) -> SessionSweeper {
        SessionSweeper::new(Arc::clone(&self.session_store))
    }
}
