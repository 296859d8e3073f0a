//! Capability resolution.
//!
//! Turns a validated manifest into the session's effective capability flags
//! and command permissions. Resolution is pure: the same manifest always
//! produces the same [`CapabilitySet`].
//!
//! Only the profiles the session actually embodies count. Coordinator-type
//! modes need exactly one self-identity; under the permissive policy the
//! first profile in roster order is used. A manifest that breaks the policy
//! resolves to the fallback set, since no prompt can be composed for it.
//!
//! Steps, in order:
//! 1. mode defaults for capabilities and catalog commands
//! 2. explicit `session.allowedCommands` replaces the non-core defaults
//! 3. profile overrides: capabilities, then command groups, then commands
//! 4. commands whose gating capability is off are blocked
//! 5. the core commands are unioned back in
//! 6. hard blocks

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::command::{
    commands_in_group, find_command, CommandDefinition, COMMAND_CATALOG, CORE_COMMANDS,
    FALLBACK_COMMANDS, SPAWN_COMMAND,
};
use crate::domain::models::{
    AgentMode, BlockReason, Capability, CapabilitySet, IdentityProfile, Manifest, Resolution,
};

/// Per-command state while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandState {
    Allowed,
    Blocked(BlockReason),
}

/// Overrides from every owned profile folded into one patch.
///
/// Profiles are merged in roster order; when two profiles disagree on the
/// same key the grant wins.
#[derive(Debug, Default)]
struct MergedOverrides {
    capabilities: BTreeMap<String, bool>,
    groups: BTreeMap<String, bool>,
    commands: BTreeMap<String, bool>,
}

impl MergedOverrides {
    fn from_profiles(profiles: &[IdentityProfile]) -> Self {
        let mut merged = Self::default();
        for profile in profiles {
            merge_into(&mut merged.capabilities, &profile.capabilities);
            merge_into(&mut merged.groups, &profile.command_permissions.groups);
            merge_into(&mut merged.commands, &profile.command_permissions.commands);
        }
        merged
    }
}

fn merge_into(target: &mut BTreeMap<String, bool>, source: &BTreeMap<String, bool>) {
    for (key, &value) in source {
        target
            .entry(key.clone())
            .and_modify(|existing| *existing |= value)
            .or_insert(value);
    }
}

/// Working state of one resolution.
struct ResolutionState {
    mode: AgentMode,
    capabilities: BTreeMap<Capability, bool>,
    commands: BTreeMap<&'static str, CommandState>,
    unknown: BTreeSet<String>,
}

impl ResolutionState {
    fn with_defaults(mode: AgentMode) -> Self {
        let capabilities = Capability::ALL
            .iter()
            .map(|cap| (*cap, cap.default_for(mode)))
            .collect();

        let commands = COMMAND_CATALOG
            .iter()
            .map(|cmd| {
                let state = if !cmd.is_compatible_with(mode) {
                    CommandState::Blocked(BlockReason::ModeIncompatible)
                } else if cmd.is_default_for(mode) {
                    CommandState::Allowed
                } else {
                    CommandState::Blocked(BlockReason::NotGranted)
                };
                (cmd.name, state)
            })
            .collect();

        Self {
            mode,
            capabilities,
            commands,
            unknown: BTreeSet::new(),
        }
    }

    fn apply_allow_list(&mut self, allowed: &[String]) {
        for cmd in COMMAND_CATALOG {
            if !cmd.is_core() && cmd.is_compatible_with(self.mode) {
                self.commands
                    .insert(cmd.name, CommandState::Blocked(BlockReason::NotGranted));
            }
        }

        for name in allowed {
            match find_command(name) {
                None => {
                    debug!(command = %name, "allow-list names unknown command");
                    self.unknown.insert(name.clone());
                }
                Some(cmd) if !cmd.is_compatible_with(self.mode) => {
                    debug!(command = %name, mode = %self.mode, "allow-list entry not compatible with mode");
                }
                Some(cmd) => {
                    self.commands.insert(cmd.name, CommandState::Allowed);
                }
            }
        }
    }

    fn apply_overrides(&mut self, overrides: &MergedOverrides) {
        for (name, &enabled) in &overrides.capabilities {
            let Some(cap) = Capability::from_str(name) else {
                warn!(capability = %name, "ignoring override for unknown capability");
                continue;
            };
            if enabled {
                if !cap.is_compatible_with(self.mode) {
                    warn!(capability = %cap, mode = %self.mode, "ignoring capability grant incompatible with mode");
                    continue;
                }
                self.capabilities.insert(cap, true);
                for cmd in COMMAND_CATALOG.iter().filter(|c| c.requires == Some(cap)) {
                    self.grant(cmd);
                }
            } else {
                self.capabilities.insert(cap, false);
            }
        }

        for (group, &enabled) in &overrides.groups {
            let mut matched = false;
            for cmd in commands_in_group(group) {
                matched = true;
                self.toggle(cmd, enabled);
            }
            if !matched {
                warn!(group = %group, "ignoring override for unknown command group");
            }
        }

        for (name, &enabled) in &overrides.commands {
            match find_command(name) {
                Some(cmd) => self.toggle(cmd, enabled),
                None => {
                    debug!(command = %name, "override names unknown command");
                    self.unknown.insert(name.clone());
                }
            }
        }
    }

    fn toggle(&mut self, cmd: &'static CommandDefinition, enabled: bool) {
        if enabled {
            self.grant(cmd);
        } else if !cmd.is_core() {
            self.commands
                .insert(cmd.name, CommandState::Blocked(BlockReason::Revoked));
        }
    }

    fn grant(&mut self, cmd: &'static CommandDefinition) {
        if cmd.is_compatible_with(self.mode) {
            self.commands.insert(cmd.name, CommandState::Allowed);
        } else {
            debug!(command = cmd.name, mode = %self.mode, "grant ignored, command not compatible with mode");
        }
    }

    fn apply_capability_gates(&mut self) {
        for cmd in COMMAND_CATALOG {
            let Some(cap) = cmd.requires else { continue };
            let enabled = self.capabilities.get(&cap).copied().unwrap_or(false);
            if !enabled && self.commands.get(cmd.name) == Some(&CommandState::Allowed) {
                self.commands.insert(
                    cmd.name,
                    CommandState::Blocked(BlockReason::CapabilityDisabled),
                );
            }
        }
    }

    fn apply_core_floor(&mut self) {
        for name in CORE_COMMANDS {
            if let Some(cmd) = find_command(name) {
                self.commands.insert(cmd.name, CommandState::Allowed);
            }
        }
    }

    fn apply_hard_blocks(&mut self) {
        if self.mode == AgentMode::CoordinatedCoordinator {
            self.capabilities.insert(Capability::CanSpawnSessions, false);
            self.commands
                .insert(SPAWN_COMMAND, CommandState::Blocked(BlockReason::HardBlocked));
        }
    }

    fn finish(self, resolution: Resolution) -> CapabilitySet {
        let mut allowed_commands = BTreeSet::new();
        let mut blocked_commands = BTreeMap::new();
        for (name, state) in self.commands {
            match state {
                CommandState::Allowed => {
                    allowed_commands.insert(name.to_string());
                }
                CommandState::Blocked(reason) => {
                    blocked_commands.insert(name.to_string(), reason);
                }
            }
        }
        for name in self.unknown {
            blocked_commands.insert(name, BlockReason::UnknownCommand);
        }

        CapabilitySet {
            capabilities: self.capabilities,
            allowed_commands,
            blocked_commands,
            resolution,
        }
    }
}

/// Computes effective permissions for a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityResolver {
    permissive_identity: bool,
}

impl CapabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the process-wide identity policy. A manifest's own
    /// `permissiveIdentity` flag wins when present.
    pub fn with_permissive_identity(mut self, permissive: bool) -> Self {
        self.permissive_identity = permissive;
        self
    }

    pub fn is_permissive(&self, manifest: &Manifest) -> bool {
        manifest.permissive_identity.unwrap_or(self.permissive_identity)
    }

    /// Pick the profiles the session embodies.
    ///
    /// Worker-type sessions fold every owned profile. Coordinator-type
    /// sessions need exactly one; when permissive they take the first in
    /// roster order (or none at all) instead of failing.
    pub fn select_profiles<'m>(&self, manifest: &'m Manifest) -> DomainResult<&'m [IdentityProfile]> {
        let profiles = manifest.team_member_profiles.as_slice();
        if !manifest.mode.is_coordinator_type() || profiles.len() == 1 {
            return Ok(profiles);
        }

        if !self.is_permissive(manifest) {
            return Err(DomainError::IdentityPolicyViolation {
                mode: manifest.mode.to_string(),
                found: profiles.len(),
            });
        }

        warn!(
            mode = %manifest.mode,
            found = profiles.len(),
            "coordinator identity policy relaxed, using first profile"
        );
        Ok(&profiles[..profiles.len().min(1)])
    }

    /// Resolve permissions for the profiles that survive the identity
    /// policy, or the fallback set when the policy is violated.
    pub fn resolve(&self, manifest: &Manifest) -> CapabilitySet {
        match self.select_profiles(manifest) {
            Ok(profiles) => self.resolve_with_profiles(manifest, profiles),
            Err(e) => self.resolve_fallback(e.to_string()),
        }
    }

    /// Resolve permissions with an explicit profile list, bypassing the
    /// identity policy.
    pub fn resolve_with_profiles(
        &self,
        manifest: &Manifest,
        profiles: &[IdentityProfile],
    ) -> CapabilitySet {
        let mut state = ResolutionState::with_defaults(manifest.mode);

        if let Some(allowed) = &manifest.session.allowed_commands {
            state.apply_allow_list(allowed);
        }

        state.apply_overrides(&MergedOverrides::from_profiles(profiles));
        state.apply_capability_gates();
        state.apply_core_floor();
        state.apply_hard_blocks();

        let set = state.finish(Resolution::Resolved);
        debug!(
            mode = %manifest.mode,
            allowed = set.allowed_commands.len(),
            blocked = set.blocked_commands.len(),
            "resolved capabilities"
        );
        set
    }

    /// The minimal safe set used when no valid manifest is available.
    pub fn resolve_fallback(&self, reason: impl Into<String>) -> CapabilitySet {
        let reason = reason.into();
        warn!(reason = %reason, "using fallback capability set");

        let capabilities = Capability::ALL
            .iter()
            .map(|cap| (*cap, *cap == Capability::CanReportProgress))
            .collect();

        let mut allowed_commands = BTreeSet::new();
        let mut blocked_commands = BTreeMap::new();
        for cmd in COMMAND_CATALOG {
            if cmd.is_core() || FALLBACK_COMMANDS.contains(&cmd.name) {
                allowed_commands.insert(cmd.name.to_string());
            } else {
                blocked_commands.insert(cmd.name.to_string(), BlockReason::NotGranted);
            }
        }

        CapabilitySet {
            capabilities,
            allowed_commands,
            blocked_commands,
            resolution: Resolution::Fallback { reason },
        }
    }

    /// Resolve from raw manifest JSON, degrading to the fallback set when
    /// the manifest cannot be loaded.
    pub fn resolve_json(&self, raw: &str) -> CapabilitySet {
        match Manifest::from_json(raw) {
            Ok(manifest) => self.resolve(&manifest),
            Err(e) => self.resolve_fallback(e.to_string()),
        }
    }

    /// Resolve from a manifest file, degrading like [`Self::resolve_json`].
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> CapabilitySet {
        match Manifest::load(path) {
            Ok(manifest) => self.resolve(&manifest),
            Err(e) => self.resolve_fallback(e.to_string()),
        }
    }
}
