//! # keyward-entity
//!
//! Domain entity models shared by the Keyward crates.

pub mod key_pair;
pub mod session;

pub use key_pair::{PublicKeyInfo, RsaKeyPair};
pub use session::{IssuedToken, Principal, TokenInfo};
