//! Agent spawn CLI command.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::process::TokioProcessLauncher;
use crate::cli::output::{heading, list_table, output, truncate, warning, CommandOutput};
use crate::domain::models::{BackendKind, Config, Manifest, SpawnOptions, SpawnResult};
use crate::infrastructure::logging::SecretScrubber;
use crate::services::{PreparedSpawn, SpawnerDispatch};

const ARG_PREVIEW_LEN: usize = 72;

#[derive(Args, Debug)]
pub struct SpawnArgs {
    /// Path to the session manifest JSON
    pub manifest: PathBuf,

    /// Session id for the new agent (generated when omitted)
    #[arg(short, long)]
    pub session_id: Option<String>,

    /// Backend to use instead of the manifest's agentTool
    #[arg(short, long, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    /// Working directory for the agent process
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment entries (KEY=VALUE, repeatable)
    #[arg(short, long = "env", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Print the launch plan without starting anything
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    BackendKind::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = BackendKind::ALL.iter().map(BackendKind::as_str).collect();
        format!("unknown backend '{s}', expected one of: {}", known.join(", "))
    })
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    session_id: String,
    backend: BackendKind,
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    working_dir: Option<String>,
}

impl PlanOutput {
    fn from_prepared(prepared: PreparedSpawn) -> Self {
        let plan = prepared.plan;
        Self {
            session_id: prepared.session_id,
            backend: prepared.backend,
            program: plan.program,
            args: plan.args,
            env: SecretScrubber::new().scrub_env(&plan.env),
            working_dir: plan.working_dir.map(|d| d.display().to_string()),
        }
    }
}

impl CommandOutput for PlanOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            heading("Launch plan (dry run)"),
            format!("  session:     {}", self.session_id),
            format!("  backend:     {}", self.backend),
            format!("  program:     {}", self.program),
            format!(
                "  working dir: {}",
                self.working_dir.as_deref().unwrap_or("(inherited)")
            ),
        ];

        lines.push(String::new());
        lines.push(heading("Arguments"));
        for arg in &self.args {
            lines.push(format!("  {}", truncate(&arg.replace('\n', " "), ARG_PREVIEW_LEN)));
        }

        lines.push(String::new());
        lines.push(heading(&format!("Environment ({} entries)", self.env.len())));
        let mut table = list_table(&["variable", "value"]);
        for (key, value) in self.env.iter().filter(|(k, _)| k.starts_with("MAESTRO_")) {
            table.add_row(vec![key.as_str(), value.as_str()]);
        }
        lines.push(table.to_string());

        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
struct SpawnOutput {
    #[serde(flatten)]
    result: SpawnResult,
}

impl CommandOutput for SpawnOutput {
    fn to_human(&self) -> String {
        let r = &self.result;
        match (&r.process, &r.error) {
            (Some(handle), _) => format!(
                "Spawned {} session {} ({}), pid {}",
                r.backend,
                r.session_id,
                r.mode,
                handle.pid.map_or_else(|| "unknown".to_string(), |p| p.to_string())
            ),
            (None, error) => format!(
                "{} {} session {}: {}",
                warning("Launch failed:"),
                r.backend,
                r.session_id,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

pub async fn execute(args: SpawnArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    if let Some(backend) = args.backend {
        manifest.agent_tool = Some(backend);
    }

    let mut options = SpawnOptions::default()
        .with_manifest_path(std::fs::canonicalize(&args.manifest).unwrap_or(args.manifest));
    if let Some(dir) = args.working_dir {
        options = options.with_working_dir(dir);
    }
    for (key, value) in args.env {
        options = options.with_env(key, value);
    }

    let dispatch = SpawnerDispatch::from_config(config, Arc::new(TokioProcessLauncher::new()));

    if args.dry_run {
        let prepared = dispatch
            .prepare(&manifest, args.session_id, &options)
            .context("Failed to prepare spawn")?;
        output(&PlanOutput::from_prepared(prepared), json_mode);
        return Ok(());
    }

    let result = dispatch
        .spawn(&manifest, args.session_id, options)
        .await
        .context("Failed to spawn agent")?;
    let failed = result.error.clone();
    output(&SpawnOutput { result }, json_mode);

    match failed {
        Some(error) => anyhow::bail!("agent launch failed: {error}"),
        None => Ok(()),
    }
}
