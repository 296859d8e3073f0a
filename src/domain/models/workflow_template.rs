//! Workflow templates: ordered instructional phases for a session.
//!
//! A `WorkflowTemplate` is keyed by the mode it targets and a strategy name.
//! The built-in catalog lives in `services::workflow_registry`.

use serde::{Deserialize, Serialize};

use super::mode::AgentMode;

/// A single phase within a workflow template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPhase {
    /// Phase name (e.g., "analyze", "decompose", "execute").
    pub name: String,
    /// Instruction text rendered into the system prompt.
    pub instruction: String,
}

impl WorkflowPhase {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
        }
    }
}

/// A workflow template defining the phase sequence for one (mode, strategy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Unique id (e.g., "worker-simple", "coordinator-dag").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mode: AgentMode,
    pub strategy: String,
    /// Ordered phases.
    pub phases: Vec<WorkflowPhase>,
}

impl WorkflowTemplate {
    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.name.as_str()).collect()
    }

    pub(crate) fn builtin(
        id: &str,
        name: &str,
        description: &str,
        mode: AgentMode,
        strategy: &str,
        phases: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            mode,
            strategy: strategy.to_string(),
            phases: phases
                .iter()
                .map(|(name, instruction)| WorkflowPhase::new(*name, *instruction))
                .collect(),
        }
    }
}

/// Where the workflow rendered into a prompt came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowSource<'a> {
    /// A template from the registry.
    Template(&'a WorkflowTemplate),
    /// Freeform text supplied by an identity profile.
    Custom { profile_id: &'a str, text: &'a str },
}
