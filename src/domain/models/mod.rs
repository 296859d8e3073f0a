pub mod capability;
pub mod command;
pub mod config;
pub mod identity;
pub mod manifest;
pub mod mode;
pub mod prompt;
pub mod spawn;
pub mod task;
pub mod workflow_template;

pub use capability::{BlockReason, CapabilitySet, Resolution};
pub use command::{Capability, CommandDefinition, COMMAND_CATALOG, CORE_COMMANDS};
pub use config::{
    BackendBinaryConfig, BackendsConfig, Config, LoggingConfig, PolicyConfig, SpawnerConfig,
};
pub use identity::{CommandPermissions, Directive, IdentityProfile, ResolvedIdentity};
pub use manifest::{Manifest, ManifestBuilder, SessionConfig, TaskContext};
pub use mode::{AgentMode, ModeName};
pub use prompt::{ComposeContext, PromptEnvelope, TeamLens};
pub use spawn::{
    BackendKind, LaunchPlan, ProcessHandle, SpawnOptions, SpawnResult, SpawnState,
};
pub use task::{TaskPriority, TaskSpec, TaskStatus};
pub use workflow_template::{WorkflowPhase, WorkflowSource, WorkflowTemplate};
