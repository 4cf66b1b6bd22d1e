//! Tower/Axum middleware.

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::{RENEWED_TOKEN_EXPIRES_HEADER, RENEWED_TOKEN_HEADER, auth_middleware};
