//! Workflow template CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{heading, list_table, output, truncate, CommandOutput};
use crate::domain::models::{AgentMode, WorkflowTemplate};
use crate::services::WorkflowRegistry;

#[derive(Args, Debug)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommands,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommands {
    /// List built-in workflow templates
    List {
        /// Only show templates for this mode
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<AgentMode>,
    },
    /// Show the phases of a template
    Show {
        /// Template id (e.g. "coordinator-dag")
        id: String,
    },
}

fn parse_mode(s: &str) -> Result<AgentMode, String> {
    AgentMode::ALL
        .into_iter()
        .find(|mode| mode.as_str() == s)
        .ok_or_else(|| format!("unknown mode '{s}'"))
}

#[derive(Debug, Serialize)]
struct WorkflowSummary {
    id: String,
    mode: AgentMode,
    strategy: String,
    phase_count: usize,
    is_default: bool,
    description: String,
}

#[derive(Debug, Serialize)]
struct WorkflowListOutput {
    workflows: Vec<WorkflowSummary>,
}

impl CommandOutput for WorkflowListOutput {
    fn to_human(&self) -> String {
        if self.workflows.is_empty() {
            return "No workflow templates found.".to_string();
        }
        let mut table = list_table(&["id", "mode", "strategy", "phases", "description"]);
        for wf in &self.workflows {
            let id = if wf.is_default {
                format!("{} (default)", wf.id)
            } else {
                wf.id.clone()
            };
            table.add_row(vec![
                id,
                wf.mode.to_string(),
                wf.strategy.clone(),
                wf.phase_count.to_string(),
                truncate(&wf.description, 60),
            ]);
        }
        format!("{} workflow templates:\n{table}", self.workflows.len())
    }
}

#[derive(Debug, Serialize)]
struct WorkflowDetailOutput {
    #[serde(flatten)]
    template: WorkflowTemplate,
}

impl CommandOutput for WorkflowDetailOutput {
    fn to_human(&self) -> String {
        let t = &self.template;
        let mut lines = vec![
            heading(&format!("Workflow: {} ({})", t.name, t.id)),
            format!("Mode: {}  Strategy: {}", t.mode, t.strategy),
            t.description.clone(),
            format!("Phases ({}):", t.phases.len()),
        ];
        for (i, phase) in t.phases.iter().enumerate() {
            lines.push(format!("\n  {}. {}", i + 1, phase.name));
            lines.push(format!("     {}", phase.instruction));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: WorkflowArgs, json_mode: bool) -> Result<()> {
    let registry = WorkflowRegistry::new();
    match args.command {
        WorkflowCommands::List { mode } => {
            let workflows = registry
                .all()
                .filter(|t| mode.map_or(true, |m| t.mode == m))
                .map(|t| WorkflowSummary {
                    id: t.id.clone(),
                    mode: t.mode,
                    strategy: t.strategy.clone(),
                    phase_count: t.phases.len(),
                    is_default: registry.default_for(t.mode).id == t.id,
                    description: t.description.clone(),
                })
                .collect();
            output(&WorkflowListOutput { workflows }, json_mode);
        }
        WorkflowCommands::Show { id } => {
            let template = registry
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("Workflow template '{id}' not found"))?;
            output(
                &WorkflowDetailOutput {
                    template: template.clone(),
                },
                json_mode,
            );
        }
    }
    Ok(())
}
