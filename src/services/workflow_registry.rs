//! Built-in workflow templates.
//!
//! The catalog is built once per process and never mutated. Every mode has a
//! default template, so [`WorkflowRegistry::resolve`] always returns one.

use std::sync::LazyLock;

use tracing::debug;

use crate::domain::models::{AgentMode, WorkflowTemplate};

static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

/// The built-in templates. Each mode's default is held in its own field so
/// every mode always has one.
struct Catalog {
    worker: WorkflowTemplate,
    coordinator: WorkflowTemplate,
    coordinated_worker: WorkflowTemplate,
    coordinated_coordinator: WorkflowTemplate,
    alternatives: Vec<WorkflowTemplate>,
}

impl Catalog {
    fn default_for(&self, mode: AgentMode) -> &WorkflowTemplate {
        match mode {
            AgentMode::Worker => &self.worker,
            AgentMode::Coordinator => &self.coordinator,
            AgentMode::CoordinatedWorker => &self.coordinated_worker,
            AgentMode::CoordinatedCoordinator => &self.coordinated_coordinator,
        }
    }

    fn builtin() -> Self {
        Self {
            worker: WorkflowTemplate::builtin(
                "worker-simple",
                "Simple worker",
                "Work the assigned tasks directly and report as you go.",
                AgentMode::Worker,
                "simple",
                &[
                    ("init", "Read your assigned tasks with `maestro task get <taskId>` and confirm you understand the acceptance criteria."),
                    ("execute", "Implement the tasks. Report meaningful milestones with `maestro report progress`."),
                    ("complete", "When every task is done, run `maestro report complete` with a short summary. Use `maestro report blocked` if you cannot continue."),
                ],
            ),
            coordinator: WorkflowTemplate::builtin(
                "coordinator-default",
                "Coordinator",
                "Decompose work, delegate it to spawned workers, and verify the result.",
                AgentMode::Coordinator,
                "default",
                &[
                    ("analyze", "Read the assigned tasks and the team roster. Identify the skills each task needs."),
                    ("decompose", "Split the work into subtasks with `maestro task create --parent <taskId>`. Each subtask must be independently verifiable."),
                    ("spawn", "Spawn one worker per subtask with `maestro session spawn`, picking the team member whose role fits."),
                    ("monitor", "Follow workers with `maestro session watch` and `maestro session logs`. Answer questions promptly."),
                    ("recover", "If a worker fails or stalls, read its logs, adjust the subtask, and spawn a replacement."),
                    ("verify", "Check every subtask against its acceptance criteria before accepting it."),
                    ("complete", "Report completion of the parent task with `maestro report complete`."),
                ],
            ),
            coordinated_worker: WorkflowTemplate::builtin(
                "coordinated-worker-default",
                "Coordinated worker",
                "Execute delegated work and keep the coordinator informed.",
                AgentMode::CoordinatedWorker,
                "default",
                &[
                    ("init", "Read the directive from your coordinator and your assigned tasks."),
                    ("execute", "Implement the tasks. Report progress with `maestro report progress` so your coordinator can follow along."),
                    ("report", "If you are blocked or need a decision, message your coordinator with `maestro session prompt`."),
                    ("complete", "Run `maestro report complete` with a summary your coordinator can verify."),
                ],
            ),
            coordinated_coordinator: WorkflowTemplate::builtin(
                "coordinated-coordinator-default",
                "Coordinated coordinator",
                "Plan and track delegated work for a parent coordinator without spawning sessions.",
                AgentMode::CoordinatedCoordinator,
                "default",
                &[
                    ("analyze", "Read the directive from your coordinator and the assigned tasks."),
                    ("decompose", "Break the work into subtasks with `maestro task create --parent <taskId>`."),
                    ("delegate", "Ask your coordinator or sibling sessions to take subtasks with `maestro session prompt`. You cannot spawn sessions yourself."),
                    ("monitor", "Track subtask status with `maestro task children <taskId>` and `maestro session watch`."),
                    ("verify", "Check every subtask against its acceptance criteria."),
                    ("complete", "Report completion to your coordinator with `maestro report complete`."),
                ],
            ),
            alternatives: vec![
                WorkflowTemplate::builtin(
                    "worker-tree",
                    "Task-tree worker",
                    "Walk a task tree depth-first, finishing children before their parents.",
                    AgentMode::Worker,
                    "tree",
                    &[
                        ("analyze", "Study the task tree and list the leaf tasks in the order you will complete them."),
                        ("plan", "Check dependencies between subtasks; a subtask starts only after the tasks it depends on."),
                        ("execute", "Complete each leaf subtask, reporting progress on that subtask as you finish it."),
                        ("integrate", "Once all children of a task are done, verify the parent task's acceptance criteria."),
                        ("complete", "Run `maestro report complete` on the root task with a summary of the whole tree."),
                    ],
                ),
                WorkflowTemplate::builtin(
                    "coordinator-batching",
                    "Batching coordinator",
                    "Run subtasks in fixed-size batches and verify each batch before the next.",
                    AgentMode::Coordinator,
                    "batching",
                    &[
                        ("analyze", "Read the assigned tasks and the team roster."),
                        ("decompose", "Create subtasks with `maestro task create --parent <taskId>`."),
                        ("batch", "Group independent subtasks into batches small enough to review together."),
                        ("spawn", "Spawn workers for one batch at a time with `maestro session spawn`."),
                        ("monitor", "Watch the batch with `maestro session watch` until every worker finishes."),
                        ("verify", "Review the batch results before starting the next batch."),
                        ("complete", "After the last batch, report completion with `maestro report complete`."),
                    ],
                ),
                WorkflowTemplate::builtin(
                    "coordinator-dag",
                    "DAG coordinator",
                    "Schedule subtasks by dependency, spawning each wave once its inputs are ready.",
                    AgentMode::Coordinator,
                    "dag",
                    &[
                        ("analyze", "Read the assigned tasks and the team roster."),
                        ("decompose", "Create subtasks and record their dependencies."),
                        ("schedule", "Order subtasks into waves; a wave contains only subtasks whose dependencies are complete."),
                        ("spawn", "Spawn workers for the current wave with `maestro session spawn`."),
                        ("monitor", "Watch running workers. When a wave finishes, move on to the next."),
                        ("verify", "Check each finished subtask against its acceptance criteria."),
                        ("complete", "When the final wave is verified, report completion with `maestro report complete`."),
                    ],
                ),
            ],
        }
    }
}

/// Read-only access to the workflow template catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowRegistry;

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self
    }

    /// All templates, grouped by mode with each mode's default first.
    pub fn all(&self) -> impl Iterator<Item = &'static WorkflowTemplate> {
        let catalog: &'static Catalog = &CATALOG;
        AgentMode::ALL.into_iter().flat_map(move |mode| {
            std::iter::once(catalog.default_for(mode))
                .chain(catalog.alternatives.iter().filter(move |t| t.mode == mode))
        })
    }

    pub fn get(&self, id: &str) -> Option<&'static WorkflowTemplate> {
        self.all().find(|t| t.id == id)
    }

    /// Find the template for a mode by strategy name or template id.
    pub fn lookup(&self, mode: AgentMode, strategy: &str) -> Option<&'static WorkflowTemplate> {
        self.all()
            .find(|t| t.mode == mode && (t.strategy == strategy || t.id == strategy))
    }

    pub fn default_for(&self, mode: AgentMode) -> &'static WorkflowTemplate {
        CATALOG.default_for(mode)
    }

    /// Template for a mode and optional strategy, falling back to the mode
    /// default when the strategy is absent or unknown.
    pub fn resolve(&self, mode: AgentMode, strategy: Option<&str>) -> &'static WorkflowTemplate {
        match strategy {
            Some(strategy) => self.lookup(mode, strategy).unwrap_or_else(|| {
                debug!(mode = %mode, strategy, "unknown workflow strategy, using mode default");
                self.default_for(mode)
            }),
            None => self.default_for(mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_mode_has_default() {
        let registry = WorkflowRegistry::new();
        for mode in AgentMode::ALL {
            let default = registry.default_for(mode);
            assert_eq!(default.mode, mode);
            assert_eq!(registry.get(&default.id), Some(default));
        }
    }

    #[test]
    fn test_catalog_order_groups_modes() {
        let ids: Vec<&str> = WorkflowRegistry::new().all().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "worker-simple",
                "worker-tree",
                "coordinator-default",
                "coordinator-batching",
                "coordinator-dag",
                "coordinated-worker-default",
                "coordinated-coordinator-default",
            ]
        );
    }

    #[test]
    fn test_alternatives_are_never_defaults() {
        let registry = WorkflowRegistry::new();
        for template in registry.all() {
            let is_default = registry.default_for(template.mode).id == template.id;
            assert_eq!(is_default, !matches!(template.strategy.as_str(), "tree" | "batching" | "dag"));
        }
    }

    #[test]
    fn test_template_ids_unique() {
        let registry = WorkflowRegistry::new();
        let ids: HashSet<&str> = registry.all().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), registry.all().count());
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_phase_sequences() {
        let registry = WorkflowRegistry::new();
        assert_eq!(
            registry.get("worker-simple").unwrap().phase_names(),
            vec!["init", "execute", "complete"]
        );
        assert_eq!(
            registry.get("coordinator-default").unwrap().phase_names(),
            vec!["analyze", "decompose", "spawn", "monitor", "recover", "verify", "complete"]
        );
    }

    #[test]
    fn test_lookup_by_strategy() {
        let registry = WorkflowRegistry::new();
        assert_eq!(registry.lookup(AgentMode::Coordinator, "dag").unwrap().id, "coordinator-dag");
        assert_eq!(registry.lookup(AgentMode::Worker, "tree").unwrap().id, "worker-tree");
        assert!(registry.lookup(AgentMode::Worker, "dag").is_none());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_mode_default() {
        let registry = WorkflowRegistry::new();
        assert_eq!(registry.resolve(AgentMode::Worker, Some("unknown")).id, "worker-simple");
        assert_eq!(registry.resolve(AgentMode::Coordinator, None).id, "coordinator-default");
        assert_eq!(
            registry.resolve(AgentMode::Coordinator, Some("batching")).id,
            "coordinator-batching"
        );
    }

    #[test]
    fn test_coordinated_coordinator_template_never_spawns() {
        let template = WorkflowRegistry::new().default_for(AgentMode::CoordinatedCoordinator);
        assert!(!template.phase_names().contains(&"spawn"));
    }
}
