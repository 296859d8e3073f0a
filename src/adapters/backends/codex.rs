//! OpenAI Codex CLI backend.

use std::collections::BTreeMap;

use crate::domain::models::{BackendBinaryConfig, BackendKind, Manifest, PromptEnvelope};
use crate::domain::ports::{AgentBackend, Invocation};

use super::{push_model, wants_bypass};

/// Codex has no separate system prompt flag, so it receives the
/// concatenated envelope as its single prompt.
#[derive(Debug, Clone)]
pub struct CodexBackend {
    config: BackendBinaryConfig,
}

impl CodexBackend {
    pub fn new(config: BackendBinaryConfig) -> Self {
        Self { config }
    }
}

impl Default for CodexBackend {
    fn default() -> Self {
        Self::new(BackendBinaryConfig::new("codex"))
    }
}

impl AgentBackend for CodexBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Codex
    }

    fn build_invocation(&self, manifest: &Manifest, envelope: &PromptEnvelope) -> Invocation {
        let mut args = Vec::new();
        push_model(&mut args, manifest);
        if wants_bypass(manifest) {
            args.push("--full-auto".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.push(envelope.concatenated());

        Invocation {
            program: self.config.binary_path.clone(),
            args,
        }
    }

    fn backend_env(&self) -> &BTreeMap<String, String> {
        &self.config.env
    }
}
