//! Route definitions for the Keyward HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().merge(crypto_routes()).merge(auth_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Public key exposure and key administration
fn crypto_routes() -> Router<AppState> {
    Router::new()
        .route("/crypto/public-key", get(handlers::crypto::public_key))
        .route("/crypto/keys", get(handlers::crypto::list_keys))
        .route("/crypto/keys/rotate", post(handlers::crypto::rotate_key))
        .route("/crypto/keys/{key_id}", delete(handlers::crypto::purge_key))
}

/// Login, logout and session administration
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/auth/users/{user_id}/sessions",
            delete(handlers::auth::kickout_user),
        )
        .route(
            "/auth/sessions/{username}/invalidate",
            post(handlers::auth::invalidate_sessions),
        )
}
