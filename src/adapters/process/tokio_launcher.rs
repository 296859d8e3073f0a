//! Launches agent processes with `tokio::process`.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::LaunchError;
use crate::domain::models::{LaunchPlan, ProcessHandle};
use crate::domain::ports::ProcessLauncher;

/// Launcher backed by `tokio::process::Command`.
///
/// The child gets exactly the environment in the plan. It is detached: a
/// background task reaps it and logs the exit status, nothing waits on it.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn launch(&self, plan: &LaunchPlan) -> Result<ProcessHandle, LaunchError> {
        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args).env_clear().envs(&plan.env);

        if let Some(dir) = &plan.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => LaunchError::BinaryNotFound(plan.program.clone()),
            _ => LaunchError::SpawnFailed {
                program: plan.program.clone(),
                reason: e.to_string(),
            },
        })?;

        let pid = child.id();
        info!(program = %plan.program, pid = ?pid, "agent process started");

        let program = plan.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(program = %program, pid = ?pid, %status, "agent process exited"),
                Err(e) => warn!(program = %program, pid = ?pid, error = %e, "failed to wait on agent process"),
            }
        });

        Ok(ProcessHandle {
            pid,
            program: plan.program.clone(),
            started_at: Utc::now(),
        })
    }
}
