//! Claude Code CLI backend.
//!
//! The system prompt goes through `--append-system-prompt` so Claude Code
//! keeps its own base prompt; the task prompt is the positional prompt.

use std::collections::BTreeMap;

use crate::domain::models::{BackendBinaryConfig, BackendKind, Manifest, PromptEnvelope};
use crate::domain::ports::{AgentBackend, Invocation};

use super::push_model;

/// Claude Code CLI backend.
#[derive(Debug, Clone)]
pub struct ClaudeCodeBackend {
    config: BackendBinaryConfig,
}

impl ClaudeCodeBackend {
    pub fn new(config: BackendBinaryConfig) -> Self {
        Self { config }
    }
}

impl Default for ClaudeCodeBackend {
    fn default() -> Self {
        Self::new(BackendBinaryConfig::new("claude"))
    }
}

impl AgentBackend for ClaudeCodeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ClaudeCode
    }

    fn build_invocation(&self, manifest: &Manifest, envelope: &PromptEnvelope) -> Invocation {
        let mut args = vec![
            "--append-system-prompt".to_string(),
            envelope.system.clone(),
        ];

        push_model(&mut args, manifest);

        if let Some(permission_mode) = manifest.session.permission_mode.as_deref() {
            args.push("--permission-mode".to_string());
            args.push(permission_mode.to_string());
        }

        if let Some(max_turns) = manifest.session.max_turns {
            args.push("--max-turns".to_string());
            args.push(max_turns.to_string());
        }

        args.extend(self.config.extra_args.iter().cloned());

        // The prompt itself
        args.push(envelope.task.clone());

        Invocation {
            program: self.config.binary_path.clone(),
            args,
        }
    }

    fn backend_env(&self) -> &BTreeMap<String, String> {
        &self.config.env
    }
}
