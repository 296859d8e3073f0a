//! Backend registry and factory.

use crate::domain::models::{BackendKind, BackendsConfig};
use crate::domain::ports::AgentBackend;

use super::claude_code::ClaudeCodeBackend;
use super::codex::CodexBackend;
use super::gemini::GeminiBackend;

/// Registry of available backends.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    config: BackendsConfig,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BackendsConfig) -> Self {
        Self { config }
    }

    /// Create a backend by kind.
    pub fn create_by_kind(&self, kind: BackendKind) -> Box<dyn AgentBackend> {
        let config = self.config.for_backend(kind).clone();
        match kind {
            BackendKind::ClaudeCode => Box::new(ClaudeCodeBackend::new(config)),
            BackendKind::Codex => Box::new(CodexBackend::new(config)),
            BackendKind::Gemini => Box::new(GeminiBackend::new(config)),
        }
    }

    /// Create a backend from its wire tag.
    pub fn create(&self, tag: &str) -> Option<Box<dyn AgentBackend>> {
        BackendKind::from_str(tag).map(|kind| self.create_by_kind(kind))
    }

    pub fn default_backend(&self) -> Box<dyn AgentBackend> {
        self.create_by_kind(BackendKind::default())
    }

    pub fn available_types(&self) -> Vec<&'static str> {
        BackendKind::ALL.iter().map(BackendKind::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        AgentMode, BackendBinaryConfig, ManifestBuilder, PromptEnvelope, TaskSpec,
    };

    #[test]
    fn test_create_by_kind() {
        let registry = BackendRegistry::new();
        for kind in BackendKind::ALL {
            let backend = registry.create_by_kind(kind);
            assert_eq!(backend.kind(), kind);
            assert_eq!(backend.name(), kind.as_str());
        }
    }

    #[test]
    fn test_factory_interface() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.create("claude-code").map(|b| b.kind()), Some(BackendKind::ClaudeCode));
        assert_eq!(registry.create("gemini").map(|b| b.kind()), Some(BackendKind::Gemini));
        assert!(registry.create("cursor").is_none());
        assert_eq!(registry.default_backend().kind(), BackendKind::ClaudeCode);
    }

    #[test]
    fn test_available_types() {
        let types = BackendRegistry::new().available_types();
        assert_eq!(types, vec!["claude-code", "codex", "gemini"]);
    }

    #[test]
    fn test_configured_binary_is_used() {
        let mut config = BackendsConfig::default();
        config.codex = BackendBinaryConfig::new("/opt/codex/bin/codex");
        let registry = BackendRegistry::with_config(config);
        let manifest = ManifestBuilder::new(AgentMode::Worker, "p")
            .task(TaskSpec::new("t1", "T"))
            .build()
            .unwrap();
        let envelope = PromptEnvelope {
            system: String::new(),
            task: String::new(),
        };
        let invocation = registry
            .create_by_kind(BackendKind::Codex)
            .build_invocation(&manifest, &envelope);
        assert_eq!(invocation.program, "/opt/codex/bin/codex");
    }
}
