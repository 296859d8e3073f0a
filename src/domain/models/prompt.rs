//! Prompt envelope models.

use serde::{Deserialize, Serialize};

/// The two prompt strings handed to a backend.
///
/// `system` holds identity, permissions and workflow and can be reused
/// across task reassignments; `task` holds the task payload and the single
/// session-context block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEnvelope {
    pub system: String,
    pub task: String,
}

impl PromptEnvelope {
    /// System and task joined for backends that take a single prompt.
    pub fn concatenated(&self) -> String {
        format!("{}\n\n{}", self.system, self.task)
    }
}

/// Per-call composition input that is not part of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeContext {
    pub session_id: String,
}

impl ComposeContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Detail level used to render teammates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamLens {
    /// Full persona text; used by worker-type sessions.
    FullExpertise,
    /// Name, role and contact id only; used by coordinator-type sessions.
    SlimRoster,
}

impl TeamLens {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullExpertise => "full_expertise",
            Self::SlimRoster => "slim_roster",
        }
    }
}
