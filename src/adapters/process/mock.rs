//! Mock launcher for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::LaunchError;
use crate::domain::models::{LaunchPlan, ProcessHandle};
use crate::domain::ports::ProcessLauncher;

/// What the mock launcher does when asked to launch.
#[derive(Debug, Clone)]
pub enum MockLaunchOutcome {
    /// Pretend to start a process with this pid.
    Started { pid: u32 },
    /// Fail with this error.
    Fail(LaunchError),
}

impl Default for MockLaunchOutcome {
    fn default() -> Self {
        Self::Started { pid: 4242 }
    }
}

/// Records every plan instead of starting processes.
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    outcome: MockLaunchOutcome,
    launches: Arc<RwLock<Vec<LaunchPlan>>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: LaunchError) -> Self {
        Self {
            outcome: MockLaunchOutcome::Fail(error),
            ..Self::default()
        }
    }

    /// Plans received so far, in call order.
    pub async fn launches(&self) -> Vec<LaunchPlan> {
        self.launches.read().await.clone()
    }

    pub async fn last_launch(&self) -> Option<LaunchPlan> {
        self.launches.read().await.last().cloned()
    }
}

#[async_trait]
impl ProcessLauncher for MockLauncher {
    async fn launch(&self, plan: &LaunchPlan) -> Result<ProcessHandle, LaunchError> {
        self.launches.write().await.push(plan.clone());
        match &self.outcome {
            MockLaunchOutcome::Started { pid } => Ok(ProcessHandle {
                pid: Some(*pid),
                program: plan.program.clone(),
                started_at: Utc::now(),
            }),
            MockLaunchOutcome::Fail(error) => Err(error.clone()),
        }
    }
}
