//! Capability resolution CLI command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{flag, heading, list_table, output, warning, CommandOutput};
use crate::domain::models::command::find_command;
use crate::domain::models::{CapabilitySet, Config, Resolution, COMMAND_CATALOG};
use crate::services::CapabilityResolver;

#[derive(Args, Debug)]
pub struct CapabilitiesArgs {
    /// Path to the session manifest JSON
    pub manifest: PathBuf,

    /// Also list blocked commands with the reason they are blocked
    #[arg(long)]
    pub show_blocked: bool,
}

#[derive(Debug, Serialize)]
struct CapabilitiesOutput {
    manifest: String,
    #[serde(flatten)]
    set: CapabilitySet,
    #[serde(skip)]
    show_blocked: bool,
}

impl CommandOutput for CapabilitiesOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        if let Resolution::Fallback { reason } = &self.set.resolution {
            lines.push(warning("Manifest could not be loaded; using the fallback capability set"));
            lines.push(format!("  reason: {reason}"));
            lines.push(String::new());
        }

        lines.push(heading(&format!("Capabilities ({})", self.manifest)));
        let mut caps = list_table(&["capability", "enabled"]);
        for (capability, enabled) in &self.set.capabilities {
            caps.add_row(vec![capability.to_string(), flag(*enabled)]);
        }
        lines.push(caps.to_string());
        lines.push(String::new());

        lines.push(heading(&format!(
            "Allowed commands ({})",
            self.set.allowed_commands.len()
        )));
        let mut allowed = list_table(&["command", "group", "syntax"]);
        for cmd in COMMAND_CATALOG.iter().filter(|c| self.set.allows(c.name)) {
            allowed.add_row(vec![cmd.name, cmd.group, cmd.syntax]);
        }
        lines.push(allowed.to_string());

        if self.show_blocked && !self.set.blocked_commands.is_empty() {
            lines.push(String::new());
            lines.push(heading(&format!(
                "Blocked commands ({})",
                self.set.blocked_commands.len()
            )));
            let mut blocked = list_table(&["command", "group", "reason"]);
            for (name, reason) in &self.set.blocked_commands {
                let group = find_command(name).map_or("-", |c| c.group);
                blocked.add_row(vec![name.as_str(), group, reason.as_str()]);
            }
            lines.push(blocked.to_string());
        }

        lines.join("\n")
    }
}

pub async fn execute(args: CapabilitiesArgs, config: &Config, json_mode: bool) -> Result<()> {
    let set = resolver(config).resolve_path(&args.manifest);

    let out = CapabilitiesOutput {
        manifest: args.manifest.display().to_string(),
        set,
        show_blocked: args.show_blocked,
    };
    output(&out, json_mode);
    Ok(())
}

fn resolver(config: &Config) -> CapabilityResolver {
    CapabilityResolver::new().with_permissive_identity(config.policy.permissive_identity)
}
