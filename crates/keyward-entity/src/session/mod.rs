//! Session and token entities.

pub mod principal;
pub mod token;

pub use principal::Principal;
pub use token::{IssuedToken, TokenInfo};
