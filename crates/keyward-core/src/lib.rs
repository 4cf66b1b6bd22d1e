//! # keyward-core
//!
//! Core crate for Keyward. Contains the unified error system and the
//! configuration schemas consumed by the crypto, auth, worker and API
//! crates.
//!
//! This crate has **no** internal dependencies on other Keyward crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
