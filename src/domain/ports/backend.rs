//! Agent backend port - interface for external agent CLIs.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::models::{BackendKind, Manifest, PromptEnvelope};

/// Environment variables that agent CLIs set to detect being run inside
/// themselves. A child launched with any of them set refuses to start or
/// runs sandboxed, so the spawner strips all of them regardless of backend.
pub const NESTED_SESSION_GUARDS: &[&str] = &[
    "CLAUDECODE",
    "CLAUDE_CODE_ENTRYPOINT",
    "CODEX_SANDBOX",
    "CODEX_SANDBOX_NETWORK_DISABLED",
    "GEMINI_CLI",
];

/// Program and arguments for one backend launch. Every backend receives
/// its prompt on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Trait for agent backend implementations.
///
/// A backend only decides how an already composed envelope is delivered to
/// its CLI. It never alters prompt content.
pub trait AgentBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Get the backend name.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Build program and arguments for this manifest and envelope.
    fn build_invocation(&self, manifest: &Manifest, envelope: &PromptEnvelope) -> Invocation;

    /// Guard variables specific to this backend, stripped on top of
    /// [`NESTED_SESSION_GUARDS`].
    fn extra_guard_vars(&self) -> &[&'static str] {
        &[]
    }

    /// Whether `key` is a nested-session guard for this backend.
    fn is_guard(&self, key: &str) -> bool {
        NESTED_SESSION_GUARDS.contains(&key) || self.extra_guard_vars().contains(&key)
    }

    /// Environment entries configured for this backend.
    fn backend_env(&self) -> &BTreeMap<String, String>;

    /// Strip nested-session guards from `env` and apply backend entries.
    fn prepare_environment(&self, mut env: BTreeMap<String, String>) -> BTreeMap<String, String> {
        for guard in NESTED_SESSION_GUARDS.iter().chain(self.extra_guard_vars()) {
            env.remove(*guard);
        }
        for (key, value) in self.backend_env() {
            if self.is_guard(key) {
                continue;
            }
            env.insert(key.clone(), value.clone());
        }
        env
    }

    /// Generate a session id of the form `sess_<millis>_<random>`.
    fn generate_session_id(&self) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("sess_{}_{}", Utc::now().timestamp_millis(), &random[..8])
    }
}
