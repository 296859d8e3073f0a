//! CLI type definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::capabilities::CapabilitiesArgs;
use crate::cli::commands::prompt::PromptArgs;
use crate::cli::commands::spawn::SpawnArgs;
use crate::cli::commands::workflow::WorkflowArgs;

#[derive(Parser, Debug)]
#[command(name = "maestro")]
#[command(about = "Maestro - capability resolution and prompt composition for agent sessions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .maestro/config.yaml plus MAESTRO_* overrides)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the effective capabilities of a session manifest
    Capabilities(CapabilitiesArgs),

    /// Compose the system and task prompts for a manifest
    Prompt(PromptArgs),

    /// Launch an agent session for a manifest
    Spawn(SpawnArgs),

    /// Inspect built-in workflow templates
    Workflow(WorkflowArgs),
}
