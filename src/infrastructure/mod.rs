//! Infrastructure layer module
//!
//! - Configuration management (figment: defaults, YAML files, `MAESTRO_*` env)
//! - Logging infrastructure (tracing, rotated files, secret redaction)

pub mod config;
pub mod logging;
