//! Identity profiles (team members) and the merged self-identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boolean patches applied on top of resolved command permissions.
///
/// `groups` toggles every command in a catalog group; `commands` toggles
/// single commands and wins over a group toggle for the same command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPermissions {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, bool>,
}

impl CommandPermissions {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.commands.is_empty()
    }
}

/// One persona a session may embody, or a teammate on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Freeform persona instructions.
    #[serde(default)]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Capability overrides keyed by capability name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "CommandPermissions::is_empty")]
    pub command_permissions: CommandPermissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_template_id: Option<String>,
    /// Freeform workflow text, takes precedence over any template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_workflow: Option<String>,
}

impl IdentityProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            identity: String::new(),
            avatar: None,
            capabilities: BTreeMap::new(),
            command_permissions: CommandPermissions::default(),
            workflow_template_id: None,
            custom_workflow: None,
        }
    }

    pub fn with_identity(mut self, instructions: impl Into<String>) -> Self {
        self.identity = instructions.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_capability(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.capabilities.insert(name.into(), enabled);
        self
    }

    pub fn with_group_permission(mut self, group: impl Into<String>, enabled: bool) -> Self {
        self.command_permissions.groups.insert(group.into(), enabled);
        self
    }

    pub fn with_command_permission(mut self, command: impl Into<String>, enabled: bool) -> Self {
        self.command_permissions
            .commands
            .insert(command.into(), enabled);
        self
    }

    pub fn with_workflow_template(mut self, template_id: impl Into<String>) -> Self {
        self.workflow_template_id = Some(template_id.into());
        self
    }

    pub fn with_custom_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.custom_workflow = Some(workflow.into());
        self
    }

    fn role_label(&self) -> String {
        if self.role.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.role)
        }
    }
}

/// A directive handed down from the parent coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_session_id: Option<String>,
}

/// The session's self-identity after folding its owned profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// True when more than one profile was folded in.
    pub merged: bool,
    /// One combined role description listing every role.
    pub combined_role: String,
    /// The folded profiles, in roster order.
    pub profiles: Vec<IdentityProfile>,
}

impl ResolvedIdentity {
    /// Fold an ordered list of profiles into one identity.
    ///
    /// Returns `None` for an empty list: a session without a persona renders
    /// no self-identity at all.
    pub fn fold(profiles: &[IdentityProfile]) -> Option<Self> {
        profiles.iter().fold(None, |acc: Option<Self>, profile| {
            Some(match acc {
                None => Self {
                    merged: false,
                    combined_role: profile.role.clone(),
                    profiles: vec![profile.clone()],
                },
                Some(mut identity) => {
                    identity.merged = true;
                    identity.profiles.push(profile.clone());
                    identity.combined_role = identity
                        .profiles
                        .iter()
                        .map(IdentityProfile::role_label)
                        .collect::<Vec<_>>()
                        .join(", ");
                    identity
                }
            })
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.id.as_str())
    }

    /// The single profile of an unmerged identity.
    pub fn primary(&self) -> &IdentityProfile {
        &self.profiles[0]
    }
}
