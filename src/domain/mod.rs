//! Domain layer for the Maestro session engine
//!
//! Pure models, the command catalog, errors, and the ports that outer layers
//! implement. Nothing in here performs I/O except `Manifest::load`.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, LaunchError, ManifestError};
