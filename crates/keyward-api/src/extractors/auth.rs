//! `AuthUser` extractor: reads the session the auth middleware resolved.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use keyward_core::error::AppError;
use keyward_entity::session::TokenInfo;

use crate::error::ApiError;

/// Session resolved from the bearer token, stored in request extensions.
///
/// Absent for anonymous requests.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The presented bearer token.
    pub token: String,
    pub info: TokenInfo,
}

/// Extracted authenticated user available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl AuthUser {
    pub fn token(&self) -> &str {
        &self.0.token
    }

    pub fn info(&self) -> &TokenInfo {
        &self.0.info
    }

    /// Rejects callers without `role`.
    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.0.info.has_role(role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Role '{role}' required")).into())
        }
    }
}

impl std::ops::Deref for AuthUser {
    type Target = TokenInfo;
    fn deref(&self) -> &Self::Target {
        &self.0.info
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Authentication required").into())
    }
}
