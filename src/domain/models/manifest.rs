//! Session manifest: wire format and validation.
//!
//! The persistence layer assembles a manifest JSON document from stored
//! project, task, session and team-member records. [`Manifest::from_json`]
//! parses and validates it once; every component downstream works on the
//! validated [`Manifest`] and never sees a legacy mode alias.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::domain::errors::ManifestError;

use super::identity::{Directive, IdentityProfile};
use super::mode::{AgentMode, ModeName};
use super::spawn::BackendKind;
use super::task::{find_parent_cycle, TaskSpec};

fn default_manifest_version() -> String {
    "1.0".to_string()
}

/// Session-level configuration carried by the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
    /// Explicit command allow-list; replaces the non-core defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

/// Optional extra context rendered into the task prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codebase_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_standards: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_tasks: Vec<String>,
}

impl TaskContext {
    pub fn is_empty(&self) -> bool {
        self.codebase_context.is_none()
            && self.project_standards.is_none()
            && self.related_tasks.is_empty()
    }
}

/// Manifest exactly as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default = "default_manifest_version")]
    manifest_version: String,
    mode: String,
    project_id: String,
    #[serde(default)]
    tasks: Vec<TaskSpec>,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    team_member_profiles: Vec<IdentityProfile>,
    #[serde(default)]
    available_team_members: Vec<IdentityProfile>,
    #[serde(default)]
    coordinator_session_id: Option<String>,
    #[serde(default)]
    initial_directive: Option<Directive>,
    #[serde(default)]
    reference_task_ids: Vec<String>,
    #[serde(default)]
    agent_tool: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    permissive_identity: Option<bool>,
    #[serde(default)]
    context: Option<TaskContext>,
}

/// A validated session manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub manifest_version: String,
    pub mode: AgentMode,
    pub project_id: String,
    pub tasks: Vec<TaskSpec>,
    pub session: SessionConfig,
    pub team_member_profiles: Vec<IdentityProfile>,
    pub available_team_members: Vec<IdentityProfile>,
    pub coordinator_session_id: Option<String>,
    pub initial_directive: Option<Directive>,
    pub reference_task_ids: Vec<String>,
    /// Declared backend; `None` means the configured default.
    pub agent_tool: Option<BackendKind>,
    pub strategy: Option<String>,
    pub permissive_identity: Option<bool>,
    pub context: Option<TaskContext>,
}

impl Manifest {
    /// Parse and validate a manifest JSON document.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest =
            serde_json::from_str(json).map_err(|e| ManifestError::Malformed(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Read, parse and validate a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ManifestError::Malformed(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    fn from_raw(raw: RawManifest) -> Result<Self, ManifestError> {
        let mode_name =
            ModeName::parse(&raw.mode).ok_or_else(|| ManifestError::UnknownMode(raw.mode.clone()))?;

        let coordinator_session_id = raw
            .coordinator_session_id
            .filter(|id| !id.trim().is_empty());
        let mode = AgentMode::normalize(mode_name, coordinator_session_id.is_some());

        let agent_tool = match raw.agent_tool.as_deref() {
            None => None,
            Some(tool) => Some(
                BackendKind::from_str(tool)
                    .ok_or_else(|| ManifestError::UnknownBackend(tool.to_string()))?,
            ),
        };

        let mut seen = HashSet::new();
        let reference_task_ids = raw
            .reference_task_ids
            .into_iter()
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        let manifest = Self {
            manifest_version: raw.manifest_version,
            mode,
            project_id: raw.project_id,
            tasks: raw.tasks,
            session: raw.session,
            team_member_profiles: raw.team_member_profiles,
            available_team_members: raw.available_team_members,
            coordinator_session_id,
            initial_directive: raw.initial_directive,
            reference_task_ids,
            agent_tool,
            strategy: raw.strategy.filter(|s| !s.trim().is_empty()),
            permissive_identity: raw.permissive_identity,
            context: raw.context.filter(|c| !c.is_empty()),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.project_id.trim().is_empty() {
            return Err(ManifestError::EmptyProjectId);
        }

        if self.tasks.is_empty() {
            return Err(ManifestError::NoTasks);
        }

        let mut ids = HashSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if task.id.trim().is_empty() {
                return Err(ManifestError::EmptyTaskId(index));
            }
            if !ids.insert(task.id.as_str()) {
                return Err(ManifestError::DuplicateTaskId(task.id.clone()));
            }
        }

        if let Some(cycle) = find_parent_cycle(&self.tasks) {
            return Err(ManifestError::ParentCycle(cycle));
        }

        match (self.mode.is_coordinated(), self.coordinator_session_id.is_some()) {
            (true, false) => {
                return Err(ManifestError::MissingCoordinator {
                    mode: self.mode.to_string(),
                })
            }
            (false, true) => {
                return Err(ManifestError::UnexpectedCoordinator {
                    mode: self.mode.to_string(),
                })
            }
            _ => {}
        }

        let mut profile_ids = HashSet::new();
        for profile in &self.team_member_profiles {
            if profile.id.trim().is_empty() {
                return Err(ManifestError::EmptyProfileId);
            }
            if !profile_ids.insert(profile.id.as_str()) {
                return Err(ManifestError::DuplicateProfileId(profile.id.clone()));
            }
        }

        Ok(())
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.id.as_str())
    }

    /// Ids of the identities this session owns.
    pub fn own_profile_ids(&self) -> HashSet<&str> {
        self.team_member_profiles
            .iter()
            .map(|p| p.id.as_str())
            .collect()
    }

    /// The declared backend, or `default` when the manifest names none.
    pub fn backend_or(&self, default: BackendKind) -> BackendKind {
        self.agent_tool.unwrap_or(default)
    }

    pub fn has_task_tree(&self) -> bool {
        self.tasks.len() > 1 && self.tasks.iter().any(|t| t.parent_id.is_some())
    }
}

/// Fluent construction of manifests for callers that build them in code.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    manifest: Manifest,
}

impl ManifestBuilder {
    pub fn new(mode: AgentMode, project_id: impl Into<String>) -> Self {
        Self {
            manifest: Manifest {
                manifest_version: default_manifest_version(),
                mode,
                project_id: project_id.into(),
                tasks: Vec::new(),
                session: SessionConfig::default(),
                team_member_profiles: Vec::new(),
                available_team_members: Vec::new(),
                coordinator_session_id: None,
                initial_directive: None,
                reference_task_ids: Vec::new(),
                agent_tool: None,
                strategy: None,
                permissive_identity: None,
                context: None,
            },
        }
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.manifest.tasks.push(task);
        self
    }

    pub fn profile(mut self, profile: IdentityProfile) -> Self {
        self.manifest.team_member_profiles.push(profile);
        self
    }

    pub fn teammate(mut self, profile: IdentityProfile) -> Self {
        self.manifest.available_team_members.push(profile);
        self
    }

    pub fn coordinator(mut self, session_id: impl Into<String>) -> Self {
        self.manifest.coordinator_session_id = Some(session_id.into());
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.manifest.initial_directive = Some(directive);
        self
    }

    pub fn reference_task(mut self, task_id: impl Into<String>) -> Self {
        let task_id = task_id.into();
        if !self.manifest.reference_task_ids.contains(&task_id) {
            self.manifest.reference_task_ids.push(task_id);
        }
        self
    }

    pub fn allowed_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest.session.allowed_commands =
            Some(commands.into_iter().map(Into::into).collect());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.manifest.session.model = Some(model.into());
        self
    }

    pub fn permission_mode(mut self, permission_mode: impl Into<String>) -> Self {
        self.manifest.session.permission_mode = Some(permission_mode.into());
        self
    }

    pub fn agent_tool(mut self, backend: BackendKind) -> Self {
        self.manifest.agent_tool = Some(backend);
        self
    }

    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.manifest.strategy = Some(strategy.into());
        self
    }

    pub fn permissive_identity(mut self, permissive: bool) -> Self {
        self.manifest.permissive_identity = Some(permissive);
        self
    }

    pub fn context(mut self, context: TaskContext) -> Self {
        self.manifest.context = Some(context).filter(|c| !c.is_empty());
        self
    }

    /// Validate and return the manifest.
    pub fn build(self) -> Result<Manifest, ManifestError> {
        self.manifest.validate()?;
        Ok(self.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(mode: &str, coordinator: Option<&str>) -> String {
        let coordinator = coordinator
            .map(|c| format!(r#","coordinatorSessionId":"{c}""#))
            .unwrap_or_default();
        format!(
            r#"{{"mode":"{mode}","projectId":"proj_1","tasks":[{{"id":"t1","title":"Implement API"}}]{coordinator}}}"#
        )
    }

    #[test]
    fn test_parse_minimal_worker() {
        let manifest = Manifest::from_json(&minimal("worker", None)).unwrap();
        assert_eq!(manifest.mode, AgentMode::Worker);
        assert_eq!(manifest.manifest_version, "1.0");
        assert_eq!(manifest.agent_tool, None);
        assert_eq!(manifest.backend_or(BackendKind::ClaudeCode), BackendKind::ClaudeCode);
        assert_eq!(manifest.tasks.len(), 1);
    }

    #[test]
    fn test_legacy_aliases_normalized_at_boundary() {
        let m = Manifest::from_json(&minimal("execute", None)).unwrap();
        assert_eq!(m.mode, AgentMode::Worker);
        let m = Manifest::from_json(&minimal("execute", Some("sess_parent"))).unwrap();
        assert_eq!(m.mode, AgentMode::CoordinatedWorker);
        let m = Manifest::from_json(&minimal("coordinate", None)).unwrap();
        assert_eq!(m.mode, AgentMode::Coordinator);
        let m = Manifest::from_json(&minimal("coordinate", Some("sess_parent"))).unwrap();
        assert_eq!(m.mode, AgentMode::CoordinatedCoordinator);
    }

    #[test]
    fn test_unknown_mode_is_configuration_error() {
        let err = Manifest::from_json(&minimal("supervisor", None)).unwrap_err();
        assert_eq!(err, ManifestError::UnknownMode("supervisor".to_string()));
    }

    #[test]
    fn test_malformed_json() {
        let err = Manifest::from_json("{not json").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }

    #[test]
    fn test_coordinated_mode_requires_coordinator() {
        let err = Manifest::from_json(&minimal("coordinated-worker", None)).unwrap_err();
        assert!(matches!(err, ManifestError::MissingCoordinator { .. }));
    }

    #[test]
    fn test_plain_mode_rejects_coordinator() {
        let err = Manifest::from_json(&minimal("worker", Some("sess_parent"))).unwrap_err();
        assert!(matches!(err, ManifestError::UnexpectedCoordinator { .. }));
    }

    #[test]
    fn test_empty_tasks_rejected() {
        let json = r#"{"mode":"worker","projectId":"p","tasks":[]}"#;
        assert_eq!(Manifest::from_json(json).unwrap_err(), ManifestError::NoTasks);
    }

    #[test]
    fn test_duplicate_task_ids_rejected() {
        let json = r#"{"mode":"worker","projectId":"p","tasks":[{"id":"a","title":"A"},{"id":"a","title":"B"}]}"#;
        assert_eq!(
            Manifest::from_json(json).unwrap_err(),
            ManifestError::DuplicateTaskId("a".to_string())
        );
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let json = r#"{"mode":"worker","projectId":"p","tasks":[
            {"id":"a","title":"A","parentId":"b"},
            {"id":"b","title":"B","parentId":"a"}]}"#;
        assert!(matches!(
            Manifest::from_json(json).unwrap_err(),
            ManifestError::ParentCycle(_)
        ));
    }

    #[test]
    fn test_unknown_agent_tool_rejected() {
        let json = r#"{"mode":"worker","projectId":"p","agentTool":"cursor","tasks":[{"id":"a","title":"A"}]}"#;
        assert_eq!(
            Manifest::from_json(json).unwrap_err(),
            ManifestError::UnknownBackend("cursor".to_string())
        );
    }

    #[test]
    fn test_reference_ids_deduplicated_in_order() {
        let json = r#"{"mode":"worker","projectId":"p","tasks":[{"id":"a","title":"A"}],
            "referenceTaskIds":["r2","r1","r2",""]}"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.reference_task_ids, vec!["r2", "r1"]);
    }

    #[test]
    fn test_blank_coordinator_id_treated_as_absent() {
        let manifest = Manifest::from_json(&minimal("execute", Some("  "))).unwrap();
        assert_eq!(manifest.mode, AgentMode::Worker);
        assert!(manifest.coordinator_session_id.is_none());
    }

    #[test]
    fn test_builder_validates() {
        let err = ManifestBuilder::new(AgentMode::Worker, "proj").build().unwrap_err();
        assert_eq!(err, ManifestError::NoTasks);

        let manifest = ManifestBuilder::new(AgentMode::CoordinatedWorker, "proj")
            .task(TaskSpec::new("t1", "Task"))
            .coordinator("sess_parent")
            .reference_task("r1")
            .reference_task("r1")
            .build()
            .unwrap();
        assert_eq!(manifest.reference_task_ids, vec!["r1"]);
    }

    #[test]
    fn test_duplicate_profile_ids_rejected() {
        let err = ManifestBuilder::new(AgentMode::Worker, "proj")
            .task(TaskSpec::new("t1", "Task"))
            .profile(IdentityProfile::new("tm", "A", "r"))
            .profile(IdentityProfile::new("tm", "B", "r"))
            .build()
            .unwrap_err();
        assert_eq!(err, ManifestError::DuplicateProfileId("tm".to_string()));
    }

    #[test]
    fn test_has_task_tree() {
        let single = ManifestBuilder::new(AgentMode::Worker, "p")
            .task(TaskSpec::new("a", "A").with_parent("x"))
            .build()
            .unwrap();
        assert!(!single.has_task_tree());

        let flat = ManifestBuilder::new(AgentMode::Worker, "p")
            .task(TaskSpec::new("a", "A"))
            .task(TaskSpec::new("b", "B"))
            .build()
            .unwrap();
        assert!(!flat.has_task_tree());

        let tree = ManifestBuilder::new(AgentMode::Worker, "p")
            .task(TaskSpec::new("a", "A"))
            .task(TaskSpec::new("b", "B").with_parent("a"))
            .build()
            .unwrap();
        assert!(tree.has_task_tree());
    }
}
