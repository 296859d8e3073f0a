//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - `.maestro/config.yaml` and `.maestro/local.yaml`
//! - `MAESTRO_` environment overrides with `__` as the section separator
//! - Validation after extraction

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
