//! Capability flags and the static command catalog.
//!
//! Every command an agent may run through the `maestro` CLI is declared here
//! with the modes it is compatible with, the modes where it is granted by
//! default, and an optional capability that gates it. The capability
//! resolver never invents commands; it only filters this catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::mode::AgentMode;

/// A named boolean capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May launch new agent sessions.
    CanSpawnSessions,
    /// May send prompts to sibling or child sessions.
    CanPromptSessions,
    /// May create and edit tasks.
    CanManageTasks,
    /// May report progress on its tasks.
    CanReportProgress,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Self::CanSpawnSessions,
        Self::CanPromptSessions,
        Self::CanManageTasks,
        Self::CanReportProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanSpawnSessions => "can_spawn_sessions",
            Self::CanPromptSessions => "can_prompt_sessions",
            Self::CanManageTasks => "can_manage_tasks",
            Self::CanReportProgress => "can_report_progress",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "can_spawn_sessions" => Some(Self::CanSpawnSessions),
            "can_prompt_sessions" => Some(Self::CanPromptSessions),
            "can_manage_tasks" => Some(Self::CanManageTasks),
            "can_report_progress" => Some(Self::CanReportProgress),
            _ => None,
        }
    }

    /// Whether an override may switch this capability on for `mode`.
    pub fn is_compatible_with(&self, mode: AgentMode) -> bool {
        match self {
            Self::CanSpawnSessions => mode.is_coordinator_type(),
            Self::CanPromptSessions => mode != AgentMode::Worker,
            Self::CanManageTasks | Self::CanReportProgress => true,
        }
    }

    /// The mode-keyed default.
    pub fn default_for(&self, mode: AgentMode) -> bool {
        match self {
            Self::CanSpawnSessions | Self::CanManageTasks => mode.is_coordinator_type(),
            Self::CanPromptSessions => mode.is_coordinated(),
            Self::CanReportProgress => true,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which modes a catalog entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSet {
    All,
    WorkerTypes,
    CoordinatorTypes,
    Coordinated,
    /// Every mode except a plain `worker`.
    NotPlainWorker,
}

impl ModeSet {
    pub fn contains(&self, mode: AgentMode) -> bool {
        match self {
            Self::All => true,
            Self::WorkerTypes => mode.is_worker_type(),
            Self::CoordinatorTypes => mode.is_coordinator_type(),
            Self::Coordinated => mode.is_coordinated(),
            Self::NotPlainWorker => mode != AgentMode::Worker,
        }
    }
}

/// A single command in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub group: &'static str,
    pub syntax: &'static str,
    pub description: &'static str,
    /// Modes in which the command may be granted at all.
    pub compatible: ModeSet,
    /// Modes in which the command is granted without an override.
    pub default_on: ModeSet,
    /// Capability that must be enabled for the command to be allowed.
    pub requires: Option<Capability>,
}

impl CommandDefinition {
    pub fn is_core(&self) -> bool {
        CORE_COMMANDS.contains(&self.name)
    }

    pub fn is_compatible_with(&self, mode: AgentMode) -> bool {
        self.compatible.contains(mode)
    }

    pub fn is_default_for(&self, mode: AgentMode) -> bool {
        self.compatible.contains(mode) && self.default_on.contains(mode)
    }
}

/// Commands every session keeps regardless of overrides.
pub const CORE_COMMANDS: &[&str] = &["whoami", "status", "commands"];

/// Commands granted by the degraded fallback resolver, on top of the core.
pub const FALLBACK_COMMANDS: &[&str] = &["report:progress"];

/// Spawn command name, referenced by the hard-block list.
pub const SPAWN_COMMAND: &str = "session:spawn";

const fn cmd(
    name: &'static str,
    group: &'static str,
    syntax: &'static str,
    description: &'static str,
    compatible: ModeSet,
    default_on: ModeSet,
    requires: Option<Capability>,
) -> CommandDefinition {
    CommandDefinition {
        name,
        group,
        syntax,
        description,
        compatible,
        default_on,
        requires,
    }
}

use Capability::{CanManageTasks, CanPromptSessions, CanReportProgress, CanSpawnSessions};
use ModeSet::{All, CoordinatorTypes, Coordinated, NotPlainWorker};

/// The command catalog, grouped and ordered for rendering.
pub const COMMAND_CATALOG: &[CommandDefinition] = &[
    cmd("whoami", "root", "maestro whoami", "Print this session's identity and mode", All, All, None),
    cmd("status", "root", "maestro status", "Show project and task status", All, All, None),
    cmd("commands", "root", "maestro commands", "List the commands available to this session", All, All, None),
    cmd("task:list", "task", "maestro task list [--status <status>]", "List tasks in the project", All, All, None),
    cmd("task:get", "task", "maestro task get <taskId>", "Show a task with its details and docs", All, All, None),
    cmd("task:children", "task", "maestro task children <taskId>", "List the subtasks of a task", All, All, None),
    cmd("task:create", "task", "maestro task create <title> [--parent <taskId>]", "Create a task or subtask", All, CoordinatorTypes, Some(CanManageTasks)),
    cmd("task:edit", "task", "maestro task edit <taskId> [--title] [--description]", "Edit a task", All, CoordinatorTypes, Some(CanManageTasks)),
    cmd("task:delete", "task", "maestro task delete <taskId>", "Delete a task", CoordinatorTypes, CoordinatorTypes, Some(CanManageTasks)),
    cmd("task:docs:add", "task", "maestro task docs add <taskId> <title> --file <path>", "Attach a document to a task", All, All, None),
    cmd("task:docs:list", "task", "maestro task docs list <taskId>", "List documents attached to a task", All, All, None),
    cmd("report:progress", "report", "maestro report progress <message>", "Report progress on the current task", All, All, Some(CanReportProgress)),
    cmd("report:complete", "report", "maestro report complete <summary>", "Mark the current task complete", All, All, Some(CanReportProgress)),
    cmd("report:blocked", "report", "maestro report blocked <reason>", "Report that the current task is blocked", All, All, Some(CanReportProgress)),
    cmd("report:error", "report", "maestro report error <description>", "Report an error on the current task", All, All, Some(CanReportProgress)),
    cmd("session:info", "session", "maestro session info", "Show details of this session", All, All, None),
    cmd("session:list", "session", "maestro session list", "List sessions in the project", NotPlainWorker, CoordinatorTypes, None),
    cmd("session:siblings", "session", "maestro session siblings", "List sessions sharing this session's coordinator", Coordinated, Coordinated, None),
    cmd(SPAWN_COMMAND, "session", "maestro session spawn --task <taskId> [--team-member-id <id>]", "Spawn a new session for a task", CoordinatorTypes, CoordinatorTypes, Some(CanSpawnSessions)),
    cmd("session:prompt", "session", "maestro session prompt <sessionId> --message <text>", "Send a prompt to another session", NotPlainWorker, Coordinated, Some(CanPromptSessions)),
    cmd("session:watch", "session", "maestro session watch <sessionId>", "Watch a session until it finishes", CoordinatorTypes, CoordinatorTypes, None),
    cmd("session:logs", "session", "maestro session logs <sessionId>", "Read the output log of a session", CoordinatorTypes, CoordinatorTypes, None),
    cmd("session:docs:add", "session", "maestro session docs add <title> --file <path>", "Attach a document to this session", All, All, None),
    cmd("team-member:list", "team-member", "maestro team-member list", "List team members", All, All, None),
    cmd("team-member:get", "team-member", "maestro team-member get <id>", "Show a team member", All, All, None),
    cmd("team-member:create", "team-member", "maestro team-member create <name> --role <role>", "Create a team member", All, CoordinatorTypes, None),
    cmd("team-member:edit", "team-member", "maestro team-member edit <id>", "Edit a team member", CoordinatorTypes, CoordinatorTypes, None),
    cmd("team-member:delete", "team-member", "maestro team-member delete <id>", "Delete a team member", CoordinatorTypes, CoordinatorTypes, None),
    cmd("project:list", "project", "maestro project list", "List projects", All, All, None),
    cmd("project:get", "project", "maestro project get <projectId>", "Show a project", All, All, None),
];

/// Rendering order of command groups.
pub const COMMAND_GROUPS: &[&str] = &["root", "task", "report", "session", "team-member", "project"];

/// Look up a command by name.
pub fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_CATALOG.iter().find(|c| c.name == name)
}

/// All commands in a group, in catalog order.
pub fn commands_in_group(group: &str) -> impl Iterator<Item = &'static CommandDefinition> + '_ {
    COMMAND_CATALOG.iter().filter(move |c| c.group == group)
}
