//! Domain errors for the Maestro session engine.

use thiserror::Error;

use crate::domain::models::spawn::SpawnState;

/// Format a parent-link cycle as a human-readable string: `A -> B -> A`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Errors raised while loading or validating a session manifest.
///
/// These are configuration errors: they surface before capability
/// resolution starts and are never recovered from inside the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Malformed manifest: {0}")]
    Malformed(String),

    #[error("Unknown session mode: {0}")]
    UnknownMode(String),

    #[error("Unknown agent tool: {0}")]
    UnknownBackend(String),

    #[error("Manifest must contain at least one task")]
    NoTasks,

    #[error("Manifest project id cannot be empty")]
    EmptyProjectId,

    #[error("Task id cannot be empty (task #{0})")]
    EmptyTaskId(usize),

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("Task parent cycle detected: {}", format_cycle_path(.0))]
    ParentCycle(Vec<String>),

    #[error("Mode {mode} requires a coordinatorSessionId")]
    MissingCoordinator { mode: String },

    #[error("Mode {mode} must not carry a coordinatorSessionId")]
    UnexpectedCoordinator { mode: String },

    #[error("Identity profile id cannot be empty")]
    EmptyProfileId,

    #[error("Duplicate identity profile id: {0}")]
    DuplicateProfileId(String),
}

/// Domain-level errors that can occur in the session engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Identity policy violation: mode {mode} requires exactly one self-identity, found {found}")]
    IdentityPolicyViolation { mode: String, found: usize },

    #[error("Invalid spawn state transition from {from} to {to}")]
    InvalidStateTransition { from: SpawnState, to: SpawnState },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Error produced by a process launcher when the backend fails to start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Backend binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },
}
