//! Custom Axum extractors.

pub mod auth;
pub mod decrypted;

pub use auth::{AuthContext, AuthUser};
pub use decrypted::DecryptedJson;
