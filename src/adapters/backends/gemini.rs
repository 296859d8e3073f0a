//! Google Gemini CLI backend.

use std::collections::BTreeMap;

use crate::domain::models::{BackendBinaryConfig, BackendKind, Manifest, PromptEnvelope};
use crate::domain::ports::{AgentBackend, Invocation};

use super::{push_model, wants_bypass};

/// Gemini CLI backend. Starts an interactive session seeded with the
/// concatenated envelope.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    config: BackendBinaryConfig,
}

impl GeminiBackend {
    pub fn new(config: BackendBinaryConfig) -> Self {
        Self { config }
    }
}

impl Default for GeminiBackend {
    fn default() -> Self {
        Self::new(BackendBinaryConfig::new("gemini"))
    }
}

impl AgentBackend for GeminiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    fn build_invocation(&self, manifest: &Manifest, envelope: &PromptEnvelope) -> Invocation {
        let mut args = Vec::new();
        push_model(&mut args, manifest);
        if wants_bypass(manifest) {
            args.push("--yolo".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.push("--prompt-interactive".to_string());
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
