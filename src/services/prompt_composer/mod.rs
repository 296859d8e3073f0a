//! Prompt composition.
//!
//! [`PromptComposer::compose`] turns a manifest into a [`PromptEnvelope`].
//! Composition is deterministic: the same manifest and session id always
//! produce byte-identical strings, whichever backend consumes them.

mod system;
mod task;
mod xml;

use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    CapabilitySet, ComposeContext, Manifest, PromptEnvelope, ResolvedIdentity,
};
use crate::services::capability_resolver::CapabilityResolver;
use crate::services::workflow_registry::WorkflowRegistry;

/// Builds prompt envelopes from manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer {
    resolver: CapabilityResolver,
    registry: WorkflowRegistry,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the process-wide identity policy. A manifest's own
    /// `permissiveIdentity` flag wins when present.
    pub fn with_permissive_identity(mut self, permissive: bool) -> Self {
        self.resolver = self.resolver.with_permissive_identity(permissive);
        self
    }

    /// The resolver whose output this composer renders.
    pub fn resolver(&self) -> &CapabilityResolver {
        &self.resolver
    }

    /// Compose both prompts for one session.
    pub fn compose(&self, manifest: &Manifest, ctx: &ComposeContext) -> DomainResult<PromptEnvelope> {
        let (envelope, _) = self.compose_with_capabilities(manifest, ctx)?;
        Ok(envelope)
    }

    /// Compose both prompts and return the capability set they were
    /// rendered from. The set equals `self.resolver().resolve(manifest)`.
    pub fn compose_with_capabilities(
        &self,
        manifest: &Manifest,
        ctx: &ComposeContext,
    ) -> DomainResult<(PromptEnvelope, CapabilitySet)> {
        let profiles = self.resolver.select_profiles(manifest)?;
        let identity = ResolvedIdentity::fold(profiles);
        let capabilities = self.resolver.resolve_with_profiles(manifest, profiles);
        let workflow = system::select_workflow(manifest, profiles, &self.registry);

        let envelope = PromptEnvelope {
            system: system::render(manifest, identity.as_ref(), &capabilities, &workflow),
            task: task::render(manifest, ctx),
        };

        debug!(
            session_id = %ctx.session_id,
            mode = %manifest.mode,
            profiles = profiles.len(),
            system_len = envelope.system.len(),
            task_len = envelope.task.len(),
            "composed prompt envelope"
        );
        Ok((envelope, capabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{
        AgentMode, Directive, IdentityProfile, ManifestBuilder, TaskContext, TaskSpec,
    };

    fn ctx() -> ComposeContext {
        ComposeContext::new("sess_1_abc")
    }

    fn worker() -> ManifestBuilder {
        ManifestBuilder::new(AgentMode::Worker, "proj_1").task(TaskSpec::new("t1", "Implement API"))
    }

    #[test]
    fn test_worker_without_profiles_has_no_identity() {
        let envelope = PromptComposer::new().compose(&worker().build().unwrap(), &ctx()).unwrap();
        assert!(!envelope.system.contains("<self_identity"));
        assert!(envelope.system.starts_with("<maestro_system_prompt mode=\"worker\""));
        assert!(envelope.system.contains("<workflow template=\"worker-simple\" source=\"template\">"));
        assert!(!envelope.system.contains("<team_members"));
    }

    #[test]
    fn test_single_identity_not_merged() {
        let manifest = worker()
            .profile(IdentityProfile::new("tm_1", "Ada", "backend").with_identity("Writes Rust"))
            .build()
            .unwrap();
        let envelope = PromptComposer::new().compose(&manifest, &ctx()).unwrap();
        assert!(envelope.system.contains("<self_identity merged=\"false\">"));
        assert!(envelope.system.contains("<instructions>Writes Rust</instructions>"));
        assert!(!envelope.task.contains("Writes Rust"));
    }

    #[test]
    fn test_merged_identity_lists_roles() {
        let manifest = worker()
            .profile(IdentityProfile::new("tm_1", "Ada", "backend"))
            .profile(IdentityProfile::new("tm_2", "Grace", "qa"))
            .build()
            .unwrap();
        let envelope = PromptComposer::new().compose(&manifest, &ctx()).unwrap();
        assert!(envelope.system.contains("<self_identity merged=\"true\">"));
        assert!(envelope
            .system
            .contains("<combined_role>Ada (backend), Grace (qa)</combined_role>"));
    }

    #[test]
    fn test_coordinator_identity_policy() {
        let manifest = ManifestBuilder::new(AgentMode::Coordinator, "proj_1")
            .task(TaskSpec::new("t1", "Plan"))
            .profile(IdentityProfile::new("tm_1", "Lead", "lead"))
            .profile(IdentityProfile::new("tm_2", "Other", "lead"))
            .build()
            .unwrap();

        let err = PromptComposer::new().compose(&manifest, &ctx()).unwrap_err();
        assert!(matches!(err, DomainError::IdentityPolicyViolation { found: 2, .. }));

        let envelope = PromptComposer::new()
            .with_permissive_identity(true)
            .compose(&manifest, &ctx())
            .unwrap();
        assert!(envelope.system.contains("id=\"tm_1\""));
        assert!(!envelope.system.contains("id=\"tm_2\""));
    }

    #[test]
    fn test_manifest_policy_overrides_composer_default() {
        let manifest = ManifestBuilder::new(AgentMode::Coordinator, "proj_1")
            .task(TaskSpec::new("t1", "Plan"))
            .permissive_identity(false)
            .build()
            .unwrap();
        assert!(PromptComposer::new()
            .with_permissive_identity(true)
            .compose(&manifest, &ctx())
            .is_err());
    }

    #[test]
    fn test_team_lens_and_self_exclusion() {
        let roster = |b: ManifestBuilder| {
            b.teammate(IdentityProfile::new("tm_1", "Ada", "backend").with_identity("Persona A"))
                .teammate(IdentityProfile::new("tm_2", "Grace", "qa").with_identity("Persona G"))
        };

        let worker = roster(worker().profile(IdentityProfile::new("tm_1", "Ada", "backend")))
            .build()
            .unwrap();
        let system = PromptComposer::new().compose(&worker, &ctx()).unwrap().system;
        assert!(system.contains("<team_members lens=\"full_expertise\">"));
        assert!(system.contains("<expertise>Persona G</expertise>"));
        assert!(!system.contains("Persona A"));

        let coordinator = roster(
            ManifestBuilder::new(AgentMode::Coordinator, "proj_1")
                .task(TaskSpec::new("t1", "Plan"))
                .profile(IdentityProfile::new("tm_0", "Lead", "lead")),
        )
        .build()
        .unwrap();
        let system = PromptComposer::new().compose(&coordinator, &ctx()).unwrap().system;
        assert!(system.contains("<team_members lens=\"slim_roster\">"));
        assert!(system.contains("<team_member id=\"tm_2\" name=\"Grace\" role=\"qa\"/>"));
        assert!(!system.contains("Persona"));
    }

    #[test]
    fn test_coordination_context_only_in_system() {
        let manifest = ManifestBuilder::new(AgentMode::CoordinatedWorker, "proj_1")
            .task(TaskSpec::new("t1", "Fix bug"))
            .coordinator("sess_parent")
            .directive(Directive {
                subject: "Start".to_string(),
                message: "Fix the login bug".to_string(),
                from_session_id: Some("sess_parent".to_string()),
            })
            .build()
            .unwrap();
        let envelope = PromptComposer::new().compose(&manifest, &ctx()).unwrap();
        assert!(envelope.system.contains("<coordination_context>"));
        assert!(envelope.system.contains("<message>Fix the login bug</message>"));
        assert!(!envelope.task.contains("sess_parent"));
        assert!(!envelope.task.contains("coordinator"));
    }

    #[test]
    fn test_workflow_precedence() {
        let custom = worker()
            .strategy("tree")
            .profile(
                IdentityProfile::new("tm_1", "Ada", "backend")
                    .with_workflow_template("worker-tree")
                    .with_custom_workflow("Do it my way"),
            )
            .build()
            .unwrap();
        let system = PromptComposer::new().compose(&custom, &ctx()).unwrap().system;
        assert!(system.contains("<workflow source=\"custom\" profile_id=\"tm_1\">Do it my way</workflow>"));

        let template = worker()
            .profile(IdentityProfile::new("tm_1", "Ada", "backend").with_workflow_template("worker-tree"))
            .build()
            .unwrap();
        let system = PromptComposer::new().compose(&template, &ctx()).unwrap().system;
        assert!(system.contains("template=\"worker-tree\""));

        let wrong_mode = worker()
            .strategy("tree")
            .profile(
                IdentityProfile::new("tm_1", "Ada", "backend")
                    .with_workflow_template("coordinator-dag"),
            )
            .build()
            .unwrap();
        let system = PromptComposer::new().compose(&wrong_mode, &ctx()).unwrap().system;
        assert!(system.contains("template=\"worker-tree\""));
    }

    #[test]
    fn test_task_prompt_sections() {
        let manifest = worker()
            .task(TaskSpec::new("t2", "Add route").with_parent("t1"))
            .context(TaskContext {
                codebase_context: Some("axum service".to_string()),
                ..TaskContext::default()
            })
            .reference_task("ref_1")
            .build()
            .unwrap();
        let task = PromptComposer::new().compose(&manifest, &ctx()).unwrap().task;
        assert!(task.contains("<task_tree>"));
        assert!(task.contains("<codebase_context>axum service</codebase_context>"));
        assert!(task.contains("<session_id>sess_1_abc</session_id>"));
        assert_eq!(task.matches("<session_context>").count(), 1);
        assert!(task.contains("<reference_task id=\"ref_1\"/>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let manifest = ManifestBuilder::new(AgentMode::Worker, "proj_1")
            .task(TaskSpec::new("t1", "Handle <script> & \"quotes\""))
            .build()
            .unwrap();
        let task = PromptComposer::new().compose(&manifest, &ctx()).unwrap().task;
        assert!(task.contains("Handle &lt;script&gt; &amp; &quot;quotes&quot;"));
    }

    #[test]
    fn test_rendered_set_matches_resolver() {
        let manifest = ManifestBuilder::new(AgentMode::Coordinator, "proj_1")
            .task(TaskSpec::new("t1", "Plan"))
            .profile(IdentityProfile::new("a", "A", "lead").with_group_permission("team-member", false))
            .profile(IdentityProfile::new("b", "B", "lead").with_group_permission("team-member", true))
            .build()
            .unwrap();
        let composer = PromptComposer::new().with_permissive_identity(true);
        let (envelope, set) = composer.compose_with_capabilities(&manifest, &ctx()).unwrap();

        assert_eq!(composer.resolver().resolve(&manifest), set);
        assert!(!set.allows("team-member:edit"));
        assert!(!envelope.system.contains("team-member:edit"));
    }
}
