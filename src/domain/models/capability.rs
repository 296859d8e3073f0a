//! Resolved capability set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::command::Capability;

/// How a capability set was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    /// Computed from a valid manifest.
    Resolved,
    /// Minimal safe set because the manifest could not be loaded.
    Fallback { reason: String },
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Why a catalog command is not available to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The mode can never use this command.
    ModeIncompatible,
    /// Compatible, but neither a default nor granted.
    NotGranted,
    /// Explicitly revoked by an override.
    Revoked,
    /// The gating capability is switched off.
    CapabilityDisabled,
    /// Removed by a hard-block rule.
    HardBlocked,
    /// Named in an allow-list or override but absent from the catalog.
    UnknownCommand,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModeIncompatible => "mode_incompatible",
            Self::NotGranted => "not_granted",
            Self::Revoked => "revoked",
            Self::CapabilityDisabled => "capability_disabled",
            Self::HardBlocked => "hard_blocked",
            Self::UnknownCommand => "unknown_command",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective permissions of one session. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    pub capabilities: BTreeMap<Capability, bool>,
    pub allowed_commands: BTreeSet<String>,
    pub blocked_commands: BTreeMap<String, BlockReason>,
    #[serde(flatten)]
    pub resolution: Resolution,
}

impl CapabilitySet {
    pub fn allows(&self, command: &str) -> bool {
        self.allowed_commands.contains(command)
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.get(&capability).copied().unwrap_or(false)
    }

    pub fn block_reason(&self, command: &str) -> Option<BlockReason> {
        self.blocked_commands.get(command).copied()
    }

    pub fn is_fallback(&self) -> bool {
        self.resolution.is_fallback()
    }
}
