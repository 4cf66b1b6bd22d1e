//! RSA key lifecycle management.

pub mod manager;

pub use manager::{KeyGenerationRequest, KeyManager};
