//! Keyward Server: credential and session core
//!
//! Main entry point that wires all crates together and starts the server.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use keyward_api::AppState;
use keyward_auth::{PasswordHasher, PasswordValidator};
use keyward_core::config::{AppConfig, LogFormat};
use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_database::{MemoryKeyPairRepository, MemoryPrincipalRepository, PrincipalRepository};
use keyward_entity::session::Principal;
use keyward_worker::{CronScheduler, KeyRotationJob, SessionSweepJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the environment overlay and `KEYWARD__*` variables
fn load_configuration() -> AppResult<AppConfig> {
    let env = std::env::var("KEYWARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Keyward v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Repositories ─────────────────────────────────────
    let key_repo = Arc::new(MemoryKeyPairRepository::new());
    let principals = Arc::new(MemoryPrincipalRepository::new());

    // ── Step 2: Components ───────────────────────────────────────
    let state = AppState::build(config.clone(), key_repo, principals.clone())?;

    seed_bootstrap_admin(&config, principals.as_ref(), &state.password_hasher).await?;

    // Pay for key generation before the first request does.
    let active = state.key_manager.get_active_key().await?;
    tracing::info!(key_id = %active.key_id, key_size = active.key_size, "Active key ready");

    // ── Step 3: Scheduler ────────────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(config.worker.clone()).await?;
        scheduler
            .register_default_tasks(
                SessionSweepJob::new(state.session_sweeper()),
                KeyRotationJob::new(Arc::clone(&state.key_manager)),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background scheduler disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = keyward_api::build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e))?;

    tracing::info!(addr = %addr, "Keyward server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    // ── Step 5: Shutdown ─────────────────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!("Keyward server shut down gracefully");
    Ok(())
}

/// Insert the configured administrator unless it already exists
async fn seed_bootstrap_admin(
    config: &AppConfig,
    principals: &dyn PrincipalRepository,
    hasher: &PasswordHasher,
) -> AppResult<()> {
    let Some(admin) = &config.auth.bootstrap_admin else {
        return Ok(());
    };

    if principals.find_by_username(&admin.username).await?.is_some() {
        return Ok(());
    }

    if !PasswordHasher::is_hashed(&admin.password) {
        if let Err(e) = PasswordValidator::new(&config.auth).validate(&admin.password) {
            tracing::warn!(username = %admin.username, reason = %e.message, "Bootstrap admin password is weak");
        }
    }

    principals
        .create(&Principal {
            user_id: admin.user_id,
            username: admin.username.clone(),
            password_hash: hasher.hash_for_storage(&admin.password)?,
            roles: BTreeSet::from(["admin".to_string(), "user".to_string()]),
        })
        .await?;

    tracing::info!(username = %admin.username, "Bootstrap admin created");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
