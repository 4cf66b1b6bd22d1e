//! Login, logout and session administration handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;

use keyward_core::error::AppError;
use keyward_entity::session::IssuedToken;

use crate::dto::request::{InvalidateParams, LoginRequest};
use crate::dto::response::{ApiResponse, RevocationResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, DecryptedJson};
use crate::handlers::crypto::ADMIN_ROLE;
use crate::state::AppState;

/// POST /api/auth/login
///
/// The password field is decrypted before it reaches this handler.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    DecryptedJson(req): DecryptedJson<LoginRequest>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let principal = state
        .principals
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

    let device_info = header_string(&headers, USER_AGENT.as_str());
    let ip_address = header_string(&headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()));

    let issued = state
        .session_manager
        .login(&principal, &req.password, device_info, ip_address)
        .await?;

    Ok(Json(ApiResponse::ok(issued)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<bool>> {
    Json(ApiResponse::ok(state.session_manager.logout(user.token())))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse::from(user.info().clone())))
}

/// DELETE /api/auth/users/{user_id}/sessions
pub async fn kickout_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<RevocationResponse>>, ApiError> {
    user.require_role(ADMIN_ROLE)?;
    let revoked = state.session_store.kickout_user(user_id);
    tracing::info!(target_user_id = user_id, by = %user.username, revoked, "User kicked out");
    Ok(Json(ApiResponse::ok(RevocationResponse {
        revoked,
        scheduled: false,
    })))
}

/// POST /api/auth/sessions/{username}/invalidate
pub async fn invalidate_sessions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
    Query(params): Query<InvalidateParams>,
) -> Result<Json<ApiResponse<RevocationResponse>>, ApiError> {
    user.require_role(ADMIN_ROLE)?;

    let response = match params.delay_seconds {
        Some(secs) if secs > 0 => {
            state
                .session_invalidator
                .schedule_invalidation(&username, Duration::from_secs(secs));
            RevocationResponse {
                revoked: 0,
                scheduled: true,
            }
        }
        _ => RevocationResponse {
            revoked: state.session_invalidator.invalidate_now(&username),
            scheduled: false,
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
