//! Route handlers.

pub mod auth;
pub mod crypto;
pub mod health;
