//! Port trait definitions (Hexagonal Architecture)
//!
//! - AgentBackend: how one external agent CLI is invoked
//! - ProcessLauncher: how a prepared invocation becomes a running process
//!
//! The spawner works against these traits only, so tests can swap in a
//! recording launcher without touching real processes.

pub mod backend;
pub mod launcher;

pub use backend::{AgentBackend, Invocation, NESTED_SESSION_GUARDS};
pub use launcher::ProcessLauncher;
