//! Maestro - Session capability resolution and prompt composition
//!
//! Maestro launches AI coding-agent sessions (workers and coordinators) for
//! project tasks. Given a session manifest it decides which commands the
//! session may run, renders a two-part prompt, and starts the chosen agent
//! CLI with a clean environment.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Manifest, modes, command catalog, errors and ports
//! - **Service Layer** (`services`): Capability resolver, workflow registry, prompt composer, spawner
//! - **Adapters** (`adapters`): Agent backends and process launchers
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use maestro::{ComposeContext, Manifest, PromptComposer};
//!
//! let manifest = Manifest::load("manifest.json")?;
//! let envelope = PromptComposer::new().compose(&manifest, &ComposeContext::new("sess_1"))?;
//! println!("{}", envelope.system);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::backends::BackendRegistry;
pub use adapters::process::TokioProcessLauncher;
pub use domain::errors::{DomainError, DomainResult, LaunchError, ManifestError};
pub use domain::models::{
    AgentMode, BackendKind, CapabilitySet, ComposeContext, Config, Manifest, ManifestBuilder,
    PromptEnvelope, SpawnOptions, SpawnResult, SpawnState,
};
pub use domain::ports::{AgentBackend, ProcessLauncher};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CapabilityResolver, PromptComposer, SpawnerDispatch, WorkflowRegistry};
