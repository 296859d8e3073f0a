pub mod capability_resolver;
pub mod prompt_composer;
pub mod spawner;
pub mod workflow_registry;

pub use capability_resolver::CapabilityResolver;
pub use prompt_composer::PromptComposer;
pub use spawner::{PreparedSpawn, SpawnAttempt, SpawnerDispatch};
pub use workflow_registry::WorkflowRegistry;
