//! Declarative decryption of inbound request fields.

pub mod decryptor;
pub mod policy;

pub use decryptor::{CryptoGateway, DecryptReport, FailureMode};
pub use policy::{DEFAULT_KEY_ID_FIELD, EncryptedFields, FieldPolicy};
