//! CLI command implementations.

pub mod capabilities;
pub mod prompt;
pub mod spawn;
pub mod workflow;
