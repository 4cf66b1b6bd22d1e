//! Session caching, revocation and lifecycle.

pub mod cleanup;
pub mod invalidator;
pub mod manager;
pub mod store;

pub use cleanup::{SessionSweeper, SweepResult};
pub use invalidator::SessionInvalidator;
pub use manager::SessionManager;
pub use store::{SessionStats, SessionStore};
