//! Infrastructure adapters for external systems.

pub mod backends;
pub mod process;
