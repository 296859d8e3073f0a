//! Backend spawner dispatch.
//!
//! Picks the backend adapter for a manifest, composes the shared prompt
//! envelope, prepares the child environment and hands the resulting
//! [`LaunchPlan`] to a [`ProcessLauncher`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::adapters::backends::BackendRegistry;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BackendKind, ComposeContext, Config, LaunchPlan, Manifest, PromptEnvelope, SpawnOptions,
    SpawnResult, SpawnState, SpawnerConfig,
};
use crate::domain::ports::{AgentBackend, ProcessLauncher};
use crate::services::prompt_composer::PromptComposer;

pub const ENV_SESSION_ID: &str = "MAESTRO_SESSION_ID";
pub const ENV_TASK_IDS: &str = "MAESTRO_TASK_IDS";
pub const ENV_PROJECT_ID: &str = "MAESTRO_PROJECT_ID";
pub const ENV_MODE: &str = "MAESTRO_MODE";
pub const ENV_COORDINATOR_SESSION_ID: &str = "MAESTRO_COORDINATOR_SESSION_ID";
pub const ENV_SERVER_URL: &str = "MAESTRO_SERVER_URL";
pub const ENV_MANIFEST_PATH: &str = "MAESTRO_MANIFEST_PATH";

/// Tracks one spawn attempt through its states.
#[derive(Debug, Clone)]
pub struct SpawnAttempt {
    session_id: String,
    state: SpawnState,
}

impl SpawnAttempt {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            state: SpawnState::Requested,
        }
    }

    pub fn state(&self) -> SpawnState {
        self.state
    }

    pub fn advance(&mut self, next: SpawnState) -> DomainResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(session_id = %self.session_id, from = %self.state, to = %next, "spawn state transition");
        self.state = next;
        Ok(())
    }
}

/// A fully prepared launch, before anything is started.
#[derive(Debug, Clone)]
pub struct PreparedSpawn {
    pub session_id: String,
    pub backend: BackendKind,
    pub envelope: PromptEnvelope,
    pub plan: LaunchPlan,
}

/// Dispatches manifests to backend CLIs.
pub struct SpawnerDispatch {
    composer: PromptComposer,
    backends: BackendRegistry,
    launcher: Arc<dyn ProcessLauncher>,
    config: SpawnerConfig,
    host_env: Option<BTreeMap<String, String>>,
}

impl SpawnerDispatch {
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            composer: PromptComposer::new(),
            backends: BackendRegistry::new(),
            launcher,
            config: SpawnerConfig::default(),
            host_env: None,
        }
    }

    /// Build a dispatcher from application configuration.
    pub fn from_config(config: &Config, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            composer: PromptComposer::new()
                .with_permissive_identity(config.policy.permissive_identity),
            backends: BackendRegistry::with_config(config.backends.clone()),
            launcher,
            config: config.spawner.clone(),
            host_env: None,
        }
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_spawner_config(mut self, config: SpawnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a fixed host environment instead of the process environment.
    pub fn with_host_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.host_env = Some(env);
        self
    }

    fn backend_for(&self, manifest: &Manifest) -> Box<dyn AgentBackend> {
        self.backends
            .create_by_kind(manifest.backend_or(self.config.default_backend))
    }

    fn host_environment(&self) -> BTreeMap<String, String> {
        if !self.config.inherit_environment {
            return BTreeMap::new();
        }
        match &self.host_env {
            Some(env) => env.clone(),
            None => std::env::vars().collect(),
        }
    }

    /// Build the complete child environment.
    ///
    /// Host environment (when inherited), then session variables, then the
    /// backend's own entries with every nested-session guard removed, then
    /// caller extras. Guards are never passed through, even from extras.
    pub fn prepare_environment(
        &self,
        backend: &dyn AgentBackend,
        manifest: &Manifest,
        session_id: &str,
        options: &SpawnOptions,
    ) -> BTreeMap<String, String> {
        let mut env = self.host_environment();

        env.insert(ENV_SESSION_ID.to_string(), session_id.to_string());
        env.insert(
            ENV_TASK_IDS.to_string(),
            manifest.task_ids().collect::<Vec<_>>().join(","),
        );
        env.insert(ENV_PROJECT_ID.to_string(), manifest.project_id.clone());
        env.insert(ENV_MODE.to_string(), manifest.mode.to_string());

        match manifest.coordinator_session_id.as_deref() {
            Some(coordinator) => {
                env.insert(ENV_COORDINATOR_SESSION_ID.to_string(), coordinator.to_string());
            }
            None => {
                env.remove(ENV_COORDINATOR_SESSION_ID);
            }
        }
        if let Some(url) = self.config.server_url.as_deref() {
            env.insert(ENV_SERVER_URL.to_string(), url.to_string());
        }
        if let Some(path) = options.manifest_path.as_deref() {
            env.insert(ENV_MANIFEST_PATH.to_string(), path.display().to_string());
        }

        let mut env = backend.prepare_environment(env);

        for (key, value) in &options.extra_env {
            if backend.is_guard(key) {
                warn!(key = %key, "refusing to pass nested-session guard to agent");
                continue;
            }
            env.insert(key.clone(), value.clone());
        }

        env
    }

    fn working_dir(&self, manifest: &Manifest, options: &SpawnOptions) -> Option<PathBuf> {
        options
            .working_dir
            .clone()
            .or_else(|| manifest.session.working_directory.as_ref().map(PathBuf::from))
            .or_else(|| self.config.working_dir.as_ref().map(PathBuf::from))
    }

    /// Compose and plan a spawn without launching anything.
    pub fn prepare(
        &self,
        manifest: &Manifest,
        session_id: Option<String>,
        options: &SpawnOptions,
    ) -> DomainResult<PreparedSpawn> {
        let backend = self.backend_for(manifest);
        let session_id = session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| backend.generate_session_id());
        self.prepare_with(backend.as_ref(), manifest, session_id, options, None)
    }

    fn prepare_with(
        &self,
        backend: &dyn AgentBackend,
        manifest: &Manifest,
        session_id: String,
        options: &SpawnOptions,
        attempt: Option<&mut SpawnAttempt>,
    ) -> DomainResult<PreparedSpawn> {
        let envelope = self
            .composer
            .compose(manifest, &ComposeContext::new(session_id.clone()))?;

        let env = self.prepare_environment(backend, manifest, &session_id, options);
        if let Some(attempt) = attempt {
            attempt.advance(SpawnState::EnvironmentPrepared)?;
        }

        let invocation = backend.build_invocation(manifest, &envelope);
        let plan = LaunchPlan {
            program: invocation.program,
            args: invocation.args,
            env,
            working_dir: self.working_dir(manifest, options),
        };

        Ok(PreparedSpawn {
            session_id,
            backend: backend.kind(),
            envelope,
            plan,
        })
    }

    /// Spawn an agent session for `manifest`.
    ///
    /// Manifest and identity-policy errors are returned as `Err`. A launch
    /// failure is not an error: it yields a result in the `launch_failed`
    /// state carrying the launcher's message.
    pub async fn spawn(
        &self,
        manifest: &Manifest,
        session_id: Option<String>,
        options: SpawnOptions,
    ) -> DomainResult<SpawnResult> {
        let backend = self.backend_for(manifest);
        let session_id = session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| backend.generate_session_id());

        let mut attempt = SpawnAttempt::new(session_id.clone());
        info!(
            session_id = %session_id,
            backend = backend.name(),
            mode = %manifest.mode,
            "spawn requested"
        );

        let prepared = self.prepare_with(
            backend.as_ref(),
            manifest,
            session_id,
            &options,
            Some(&mut attempt),
        )?;

        attempt.advance(SpawnState::Launched)?;
        let outcome = self.launcher.launch(&prepared.plan).await;

        let (process, error) = match outcome {
            Ok(handle) => {
                attempt.advance(SpawnState::Succeeded)?;
                info!(session_id = %prepared.session_id, pid = ?handle.pid, "agent launched");
                (Some(handle), None)
            }
            Err(e) => {
                attempt.advance(SpawnState::LaunchFailed)?;
                warn!(session_id = %prepared.session_id, error = %e, "agent launch failed");
                (None, Some(e.to_string()))
            }
        };

        Ok(SpawnResult {
            session_id: prepared.session_id,
            backend: prepared.backend,
            mode: manifest.mode,
            state: attempt.state(),
            process,
            error,
        })
    }
}
