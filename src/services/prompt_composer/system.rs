//! System prompt rendering.
//!
//! The system prompt holds everything that stays valid when the session is
//! reassigned to other tasks: identity, team, coordination, permissions and
//! workflow. It never contains task fields or the session id.

use tracing::warn;

use crate::domain::models::command::{commands_in_group, COMMAND_GROUPS};
use crate::domain::models::{
    Capability, CapabilitySet, IdentityProfile, Manifest, ResolvedIdentity, TeamLens,
    WorkflowSource,
};
use crate::services::workflow_registry::WorkflowRegistry;

use super::xml::TagWriter;

/// Choose the workflow for a session.
///
/// Precedence: the first selected profile with a custom workflow, then the
/// first profile template id valid for the mode, then the manifest strategy,
/// then the mode default.
pub(crate) fn select_workflow<'a>(
    manifest: &'a Manifest,
    profiles: &'a [IdentityProfile],
    registry: &WorkflowRegistry,
) -> WorkflowSource<'a> {
    if let Some(profile) = profiles.iter().find(|p| p.custom_workflow.is_some()) {
        if let Some(text) = profile.custom_workflow.as_deref() {
            return WorkflowSource::Custom {
                profile_id: &profile.id,
                text,
            };
        }
    }

    for profile in profiles {
        let Some(template_id) = profile.workflow_template_id.as_deref() else {
            continue;
        };
        match registry.get(template_id) {
            Some(template) if template.mode == manifest.mode => {
                return WorkflowSource::Template(template);
            }
            Some(template) => warn!(
                profile = %profile.id,
                template = template_id,
                template_mode = %template.mode,
                mode = %manifest.mode,
                "profile workflow template targets another mode, ignoring"
            ),
            None => warn!(profile = %profile.id, template = template_id, "unknown workflow template, ignoring"),
        }
    }

    WorkflowSource::Template(registry.resolve(manifest.mode, manifest.strategy.as_deref()))
}

pub(crate) fn lens_for(manifest: &Manifest) -> TeamLens {
    if manifest.mode.is_worker_type() {
        TeamLens::FullExpertise
    } else {
        TeamLens::SlimRoster
    }
}

pub(crate) fn render(
    manifest: &Manifest,
    identity: Option<&ResolvedIdentity>,
    capabilities: &CapabilitySet,
    workflow: &WorkflowSource<'_>,
) -> String {
    let mut w = TagWriter::new();
    w.open(
        "maestro_system_prompt",
        &[
            ("mode", manifest.mode.as_str()),
            ("version", manifest.manifest_version.as_str()),
        ],
    );

    if let Some(identity) = identity {
        render_identity(&mut w, identity);
    }
    render_team(&mut w, manifest);
    if manifest.mode.is_coordinated() {
        render_coordination(&mut w, manifest);
    }
    render_capabilities(&mut w, capabilities);
    render_commands(&mut w, capabilities);
    render_workflow(&mut w, workflow);

    w.close("maestro_system_prompt");
    w.finish()
}

fn render_identity(w: &mut TagWriter, identity: &ResolvedIdentity) {
    let merged = if identity.merged { "true" } else { "false" };
    w.open("self_identity", &[("merged", merged)]);
    if identity.merged {
        w.leaf("combined_role", &[], &identity.combined_role);
    }
    for profile in &identity.profiles {
        let mut attrs = vec![
            ("id", profile.id.as_str()),
            ("name", profile.name.as_str()),
            ("role", profile.role.as_str()),
        ];
        if let Some(avatar) = profile.avatar.as_deref() {
            attrs.push(("avatar", avatar));
        }
        if profile.identity.is_empty() {
            w.empty("profile", &attrs);
        } else {
            w.open("profile", &attrs);
            w.leaf("instructions", &[], &profile.identity);
            w.close("profile");
        }
    }
    w.close("self_identity");
}

fn render_team(w: &mut TagWriter, manifest: &Manifest) {
    let own = manifest.own_profile_ids();
    let teammates: Vec<&IdentityProfile> = manifest
        .available_team_members
        .iter()
        .filter(|member| !own.contains(member.id.as_str()))
        .collect();
    if teammates.is_empty() {
        return;
    }

    let lens = lens_for(manifest);
    w.open("team_members", &[("lens", lens.as_str())]);
    for member in teammates {
        let attrs = [
            ("id", member.id.as_str()),
            ("name", member.name.as_str()),
            ("role", member.role.as_str()),
        ];
        match lens {
            TeamLens::FullExpertise if !member.identity.is_empty() => {
                w.open("team_member", &attrs);
                w.leaf("expertise", &[], &member.identity);
                w.close("team_member");
            }
            _ => w.empty("team_member", &attrs),
        }
    }
    w.close("team_members");
}

fn render_coordination(w: &mut TagWriter, manifest: &Manifest) {
    w.open("coordination_context", &[]);
    if let Some(coordinator) = manifest.coordinator_session_id.as_deref() {
        w.leaf("coordinator_session_id", &[], coordinator);
    }
    if let Some(directive) = &manifest.initial_directive {
        let attrs: Vec<(&str, &str)> = directive
            .from_session_id
            .as_deref()
            .map(|from| vec![("from_session_id", from)])
            .unwrap_or_default();
        w.open("initial_directive", &attrs);
        if !directive.subject.is_empty() {
            w.leaf("subject", &[], &directive.subject);
        }
        w.leaf("message", &[], &directive.message);
        w.close("initial_directive");
    }
    w.close("coordination_context");
}

fn render_capabilities(w: &mut TagWriter, capabilities: &CapabilitySet) {
    w.open(
        "capabilities",
        &[("resolution", capabilities.resolution.as_str())],
    );
    for cap in Capability::ALL {
        let enabled = if capabilities.has(cap) { "true" } else { "false" };
        w.empty("capability", &[("name", cap.as_str()), ("enabled", enabled)]);
    }
    w.close("capabilities");
}

fn render_commands(w: &mut TagWriter, capabilities: &CapabilitySet) {
    w.open("commands_reference", &[]);
    for group in COMMAND_GROUPS {
        let allowed: Vec<_> = commands_in_group(group)
            .filter(|cmd| capabilities.allows(cmd.name))
            .collect();
        if allowed.is_empty() {
            continue;
        }
        w.open("group", &[("name", *group)]);
        for cmd in allowed {
            w.leaf(
                "command",
                &[("name", cmd.name), ("syntax", cmd.syntax)],
                cmd.description,
            );
        }
        w.close("group");
    }
    w.close("commands_reference");
}

fn render_workflow(w: &mut TagWriter, workflow: &WorkflowSource<'_>) {
    match workflow {
        WorkflowSource::Template(template) => {
            w.open(
                "workflow",
                &[("template", template.id.as_str()), ("source", "template")],
            );
            for (index, phase) in template.phases.iter().enumerate() {
                let order = (index + 1).to_string();
                w.leaf(
                    "phase",
                    &[("order", order.as_str()), ("name", phase.name.as_str())],
                    &phase.instruction,
                );
            }
            w.close("workflow");
        }
        WorkflowSource::Custom { profile_id, text } => {
            w.leaf(
                "workflow",
                &[("source", "custom"), ("profile_id", *profile_id)],
                text,
            );
        }
    }
}
