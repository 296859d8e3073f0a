//! Session mode model.
//!
//! Every session runs in one of four canonical modes. Older manifests still
//! use the `execute`/`coordinate` aliases; those are folded into a canonical
//! mode exactly once, at the manifest boundary, using the presence of a
//! coordinator session id. Nothing downstream ever sees an alias.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentMode {
    /// Executes tasks on its own.
    Worker,
    /// Decomposes tasks and spawns workers.
    Coordinator,
    /// Worker reporting to a parent coordinator session.
    CoordinatedWorker,
    /// Coordinator reporting to a parent coordinator session.
    CoordinatedCoordinator,
}

impl AgentMode {
    /// All canonical modes, in declaration order.
    pub const ALL: [AgentMode; 4] = [
        Self::Worker,
        Self::Coordinator,
        Self::CoordinatedWorker,
        Self::CoordinatedCoordinator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Coordinator => "coordinator",
            Self::CoordinatedWorker => "coordinated-worker",
            Self::CoordinatedCoordinator => "coordinated-coordinator",
        }
    }

    pub fn is_worker_type(&self) -> bool {
        matches!(self, Self::Worker | Self::CoordinatedWorker)
    }

    pub fn is_coordinator_type(&self) -> bool {
        matches!(self, Self::Coordinator | Self::CoordinatedCoordinator)
    }

    pub fn is_coordinated(&self) -> bool {
        matches!(self, Self::CoordinatedWorker | Self::CoordinatedCoordinator)
    }

    /// Fold a wire mode into a canonical mode.
    ///
    /// Canonical inputs pass through untouched, so normalizing an already
    /// normalized mode is a no-op.
    pub fn normalize(mode: ModeName, has_coordinator: bool) -> Self {
        match mode {
            ModeName::Canonical(mode) => mode,
            ModeName::Execute if has_coordinator => Self::CoordinatedWorker,
            ModeName::Execute => Self::Worker,
            ModeName::Coordinate if has_coordinator => Self::CoordinatedCoordinator,
            ModeName::Coordinate => Self::Coordinator,
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mode as written in a manifest: either canonical or a legacy alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeName {
    Canonical(AgentMode),
    /// Legacy alias for the worker family.
    Execute,
    /// Legacy alias for the coordinator family.
    Coordinate,
}

impl ModeName {
    /// Parse a wire mode string. Returns `None` for anything outside the
    /// known set; the manifest loader turns that into a configuration error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "worker" => Some(Self::Canonical(AgentMode::Worker)),
            "coordinator" => Some(Self::Canonical(AgentMode::Coordinator)),
            "coordinated-worker" => Some(Self::Canonical(AgentMode::CoordinatedWorker)),
            "coordinated-coordinator" => Some(Self::Canonical(AgentMode::CoordinatedCoordinator)),
            "execute" => Some(Self::Execute),
            "coordinate" => Some(Self::Coordinate),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Self::Canonical(_))
    }
}

impl From<AgentMode> for ModeName {
    fn from(mode: AgentMode) -> Self {
        Self::Canonical(mode)
    }
}
