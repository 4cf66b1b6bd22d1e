//! # keyward-api
//!
//! HTTP boundary for Keyward built on Axum.
//!
//! Provides the public-key and session endpoints, bearer authentication
//! with transparent token renewal, the `AuthUser` and `DecryptedJson`
//! extractors, and the mapping from `AppError` to HTTP responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
