//! RSA key pair entities.

pub mod model;

pub use model::{PublicKeyInfo, RsaKeyPair};
