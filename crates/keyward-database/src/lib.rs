//! # keyward-database
//!
//! Persistence boundary for RSA key pairs and user principals. The storage
//! engine behind each repository trait is an external collaborator; this
//! crate ships the traits and in-process implementations used by the server
//! and tests.

pub mod repositories;

pub use repositories::key_pair::{KeyPairRepository, MemoryKeyPairRepository};
pub use repositories::principal::{MemoryPrincipalRepository, PrincipalRepository};
