//! Background maintenance for Keyward.
//!
//! This crate provides:
//! - A cron scheduler driving periodic jobs
//! - A session sweep evicting expired tokens and stale blacklist entries
//! - A key rotation check replacing the active key ahead of its expiry

pub mod jobs;
pub mod scheduler;

pub use jobs::{KeyRotationJob, SessionSweepJob};
pub use scheduler::CronScheduler;
