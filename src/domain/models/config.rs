use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::spawn::BackendKind;

/// Main configuration structure for Maestro
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identity policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Spawner configuration
    #[serde(default)]
    pub spawner: SpawnerConfig,

    /// Per-backend binary configuration
    #[serde(default)]
    pub backends: BackendsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}

/// Identity policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// Let coordinator-type sessions compose with zero or several
    /// self-identities by picking the first one. Manifests may override.
    #[serde(default)]
    pub permissive_identity: bool,
}

/// Spawner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpawnerConfig {
    /// Server endpoint forwarded to spawned agents as MAESTRO_SERVER_URL
    #[serde(default)]
    pub server_url: Option<String>,

    /// Backend used when a caller forces a default
    #[serde(default)]
    pub default_backend: BackendKind,

    /// Pass the host environment (minus nested-session guards) to children
    #[serde(default = "default_true")]
    pub inherit_environment: bool,

    /// Working directory used when neither the caller nor the manifest sets one
    #[serde(default)]
    pub working_dir: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            default_backend: BackendKind::default(),
            inherit_environment: true,
            working_dir: None,
        }
    }
}

/// Binary configuration for one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendBinaryConfig {
    /// Path or name of the CLI binary
    pub binary_path: String,

    /// Extra arguments appended before the prompt
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Extra environment for this backend
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl BackendBinaryConfig {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            extra_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

/// Per-backend binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendsConfig {
    #[serde(default = "default_claude_code")]
    pub claude_code: BackendBinaryConfig,

    #[serde(default = "default_codex")]
    pub codex: BackendBinaryConfig,

    #[serde(default = "default_gemini")]
    pub gemini: BackendBinaryConfig,
}

fn default_claude_code() -> BackendBinaryConfig {
    BackendBinaryConfig::new("claude")
}

fn default_codex() -> BackendBinaryConfig {
    BackendBinaryConfig::new("codex")
}

fn default_gemini() -> BackendBinaryConfig {
    BackendBinaryConfig::new("gemini")
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            claude_code: default_claude_code(),
            codex: default_codex(),
            gemini: default_gemini(),
        }
    }
}

impl BackendsConfig {
    pub fn for_backend(&self, backend: BackendKind) -> &BackendBinaryConfig {
        match backend {
            BackendKind::ClaudeCode => &self.claude_code,
            BackendKind::Codex => &self.codex,
            BackendKind::Gemini => &self.gemini,
        }
    }
}
