//! Spawn domain models.
//!
//! A spawn attempt turns a composed prompt envelope into an external agent
//! process. These types describe the backend choice, the launch plan handed
//! to a process launcher, and the bookkeeping result returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::mode::AgentMode;

/// External agent backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Claude Code CLI, the baseline adapter.
    #[default]
    ClaudeCode,
    /// OpenAI Codex CLI.
    Codex,
    /// Gemini CLI.
    Gemini,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::ClaudeCode, Self::Codex, Self::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude-code" | "claude_code" | "claude" => Some(Self::ClaudeCode),
            "codex" => Some(Self::Codex),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single spawn attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnState {
    Requested,
    EnvironmentPrepared,
    Launched,
    Succeeded,
    LaunchFailed,
}

impl SpawnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::EnvironmentPrepared => "environment_prepared",
            Self::Launched => "launched",
            Self::Succeeded => "succeeded",
            Self::LaunchFailed => "launch_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::LaunchFailed)
    }

    /// Valid transitions from this state. There is no retry edge.
    pub fn valid_transitions(&self) -> &'static [SpawnState] {
        match self {
            Self::Requested => &[Self::EnvironmentPrepared],
            Self::EnvironmentPrepared => &[Self::Launched],
            Self::Launched => &[Self::Succeeded, Self::LaunchFailed],
            Self::Succeeded | Self::LaunchFailed => &[],
        }
    }

    pub fn can_transition_to(&self, next: SpawnState) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for SpawnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied options for one spawn.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Working directory for the process; falls back to the manifest, then config.
    pub working_dir: Option<PathBuf>,
    /// Extra environment entries, applied after everything else.
    pub extra_env: BTreeMap<String, String>,
    /// Path of the manifest file, forwarded to the agent when known.
    pub manifest_path: Option<PathBuf>,
}

impl SpawnOptions {
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }
}

/// Everything a process launcher needs to start an agent.
///
/// `env` is the complete environment of the child; launchers must not
/// inherit anything beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

/// Reference to a launched process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessHandle {
    pub pid: Option<u32>,
    pub program: String,
    pub started_at: DateTime<Utc>,
}

/// Result of a spawn attempt, handed back to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnResult {
    pub session_id: String,
    pub backend: BackendKind,
    pub mode: AgentMode,
    pub state: SpawnState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpawnResult {
    pub fn is_success(&self) -> bool {
        self.state == SpawnState::Succeeded
    }
}
