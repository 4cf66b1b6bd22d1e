//! Public key exposure and key administration handlers.

use axum::Json;
use axum::extract::{Path, State};

use keyward_entity::key_pair::PublicKeyInfo;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Role allowed to list and rotate keys.
pub const ADMIN_ROLE: &str = "admin";

/// GET /api/crypto/public-key
///
/// The active key's public half; generates one on first use.
pub async fn public_key(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PublicKeyInfo>>, ApiError> {
    let info = state.key_manager.public_key().await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// GET /api/crypto/keys
pub async fn list_keys(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<PublicKeyInfo>>>, ApiError> {
    user.require_role(ADMIN_ROLE)?;
    let keys = state.key_manager.list_keys().await?;
    Ok(Json(ApiResponse::ok(keys)))
}

/// POST /api/crypto/keys/rotate
pub async fn rotate_key(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<PublicKeyInfo>>, ApiError> {
    user.require_role(ADMIN_ROLE)?;
    let key = state
        .key_manager
        .rotate(format!("Manual rotation by {}", user.username))
        .await?;
    tracing::info!(key_id = %key.key_id, by = %user.username, "Active key rotated manually");
    Ok(Json(ApiResponse::ok(key.public_info())))
}

/// DELETE /api/crypto/keys/{key_id}
pub async fn purge_key(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key_id): Path<String>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    user.require_role(ADMIN_ROLE)?;
    state.key_manager.purge_key(&key_id).await?;
    Ok(Json(ApiResponse::ok(key_id)))
}
