//! Process launcher adapters.

pub mod mock;
pub mod tokio_launcher;

pub use mock::{MockLauncher, MockLaunchOutcome};
pub use tokio_launcher::TokioProcessLauncher;
