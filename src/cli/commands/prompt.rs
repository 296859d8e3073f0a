//! Prompt composition CLI command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::adapters::backends::BackendRegistry;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ComposeContext, Config, Manifest};
use crate::services::PromptComposer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptPart {
    System,
    Task,
    Both,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Path to the session manifest JSON
    pub manifest: PathBuf,

    /// Which prompt to print
    #[arg(short, long, value_enum, default_value_t = PromptPart::Both)]
    pub part: PromptPart,

    /// Session id rendered into the task prompt (generated when omitted)
    #[arg(short, long)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct PromptOutput {
    session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<String>,
}

impl CommandOutput for PromptOutput {
    fn to_human(&self) -> String {
        [self.system.as_deref(), self.task.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub async fn execute(args: PromptArgs, config: &Config, json_mode: bool) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;

    let session_id = match args.session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => BackendRegistry::with_config(config.backends.clone())
            .create_by_kind(manifest.backend_or(config.spawner.default_backend))
            .generate_session_id(),
    };

    let envelope = PromptComposer::new()
        .with_permissive_identity(config.policy.permissive_identity)
        .compose(&manifest, &ComposeContext::new(session_id.clone()))
        .context("Failed to compose prompts")?;

    let out = PromptOutput {
        session_id,
        system: (args.part != PromptPart::Task).then_some(envelope.system),
        task: (args.part != PromptPart::System).then_some(envelope.task),
    };
    output(&out, json_mode);
    Ok(())
}
