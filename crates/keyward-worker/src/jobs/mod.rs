//! Periodic job implementations.

pub mod key_rotation;
pub mod session_sweep;

pub use key_rotation::KeyRotationJob;
pub use session_sweep::SessionSweepJob;
