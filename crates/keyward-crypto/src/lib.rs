//! # keyward-crypto
//!
//! Asymmetric key management and transparent request-field decryption.
//!
//! ## Modules
//!
//! - `rsa`: PKCS#1 v1.5 codec with chunking for payloads larger than one block
//! - `key`: [`KeyManager`]: single active key, lazy rotation, usage tracking
//! - `gateway`: [`CryptoGateway`]: declarative per-DTO field decryption

pub mod gateway;
pub mod key;
pub mod rsa;

pub use gateway::{CryptoGateway, DecryptReport, EncryptedFields, FailureMode, FieldPolicy};
pub use key::{KeyGenerationRequest, KeyManager};
