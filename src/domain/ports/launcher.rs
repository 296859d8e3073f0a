//! Process launcher port.

use async_trait::async_trait;

use crate::domain::errors::LaunchError;
use crate::domain::models::{LaunchPlan, ProcessHandle};

/// Starts a prepared agent process.
///
/// Implementations return as soon as the process is running; they do not
/// wait for it to finish and never retry.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, plan: &LaunchPlan) -> Result<ProcessHandle, LaunchError>;
}
