//! Task prompt rendering.

use crate::domain::models::task::build_task_forest;
use crate::domain::models::{ComposeContext, Manifest, TaskContext, TaskSpec};

use super::xml::TagWriter;

const REFERENCE_INSTRUCTION: &str = "These tasks hold context for your work. Before starting, fetch each one with `maestro task get <taskId>` and read its docs with `maestro task docs list <taskId>`.";

pub(crate) fn render(manifest: &Manifest, ctx: &ComposeContext) -> String {
    let mut w = TagWriter::new();
    w.open("maestro_task_prompt", &[]);

    render_tasks(&mut w, &manifest.tasks);
    if manifest.has_task_tree() {
        render_tree(&mut w, &manifest.tasks);
    }
    if let Some(context) = &manifest.context {
        render_context(&mut w, context);
    }
    render_session_context(&mut w, manifest, ctx);
    if !manifest.reference_task_ids.is_empty() {
        render_references(&mut w, &manifest.reference_task_ids);
    }

    w.close("maestro_task_prompt");
    w.finish()
}

fn render_tasks(w: &mut TagWriter, tasks: &[TaskSpec]) {
    let count = tasks.len().to_string();
    w.open("tasks", &[("count", count.as_str())]);
    for task in tasks {
        let mut attrs = vec![
            ("id", task.id.as_str()),
            ("status", task.status.as_str()),
            ("priority", task.priority.as_str()),
        ];
        if let Some(parent) = task.parent_id.as_deref() {
            attrs.push(("parent_id", parent));
        }
        w.open("task", &attrs);
        w.leaf("title", &[], &task.title);
        if !task.description.is_empty() {
            w.leaf("description", &[], &task.description);
        }
        if !task.dependencies.is_empty() {
            w.open("dependencies", &[]);
            for dep in &task.dependencies {
                w.empty("dependency", &[("id", dep.as_str())]);
            }
            w.close("dependencies");
        }
        if !task.acceptance_criteria.is_empty() {
            w.open("acceptance_criteria", &[]);
            for criterion in &task.acceptance_criteria {
                w.leaf("criterion", &[], criterion);
            }
            w.close("acceptance_criteria");
        }
        w.close("task");
    }
    w.close("tasks");
}

fn render_tree(w: &mut TagWriter, tasks: &[TaskSpec]) {
    w.open("task_tree", &[]);
    let mut open_nodes = 0;
    for entry in build_task_forest(tasks) {
        while open_nodes > entry.depth {
            w.close("node");
            open_nodes -= 1;
        }
        let attrs = [
            ("id", entry.task.id.as_str()),
            ("title", entry.task.title.as_str()),
        ];
        if entry.has_children {
            w.open("node", &attrs);
            open_nodes += 1;
        } else {
            w.empty("node", &attrs);
        }
    }
    for _ in 0..open_nodes {
        w.close("node");
    }
    w.close("task_tree");
}

fn render_context(w: &mut TagWriter, context: &TaskContext) {
    w.open("context", &[]);
    if let Some(codebase) = context.codebase_context.as_deref() {
        w.leaf("codebase_context", &[], codebase);
    }
    if let Some(standards) = context.project_standards.as_deref() {
        w.leaf("project_standards", &[], standards);
    }
    if !context.related_tasks.is_empty() {
        w.open("related_tasks", &[]);
        for id in &context.related_tasks {
            w.empty("related_task", &[("id", id.as_str())]);
        }
        w.close("related_tasks");
    }
    w.close("context");
}

fn render_session_context(w: &mut TagWriter, manifest: &Manifest, ctx: &ComposeContext) {
    w.open("session_context", &[]);
    w.leaf("session_id", &[], &ctx.session_id);
    w.leaf("project_id", &[], &manifest.project_id);
    w.leaf("mode", &[], manifest.mode.as_str());
    w.close("session_context");
}

fn render_references(w: &mut TagWriter, ids: &[String]) {
    w.open("reference_tasks", &[]);
    for id in ids {
        w.empty("reference_task", &[("id", id.as_str())]);
    }
    w.leaf("instruction", &[], REFERENCE_INSTRUCTION);
    w.close("reference_tasks");
}
