//! # keyward-auth
//!
//! Credentials and sessions for Keyward.
//!
//! ## Modules
//!
//! - `jwt`: bearer token issuance, validation, refresh and renewal checks
//! - `password`: Argon2id hashing at the persistence boundary and policy checks
//! - `session`: concurrent session store, revocation, scheduled invalidation

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, TokenIssuer};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{
    SessionInvalidator, SessionManager, SessionStats, SessionStore, SessionSweeper, SweepResult,
};
