//! Repository traits and implementations.

pub mod key_pair;
pub mod principal;
