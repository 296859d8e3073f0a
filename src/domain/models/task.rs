//! Task domain model.
//!
//! Tasks arrive inside a manifest as plain values. Parent links form a
//! forest; dependency ids are rendered as-is and never resolved here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status of a task as reported by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    InReview,
    Blocked,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Blocked => "blocked",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A task assigned to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            parent_id: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    pub fn with_acceptance_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.acceptance_criteria.push(criterion.into());
        self
    }
}

/// One task of the forest, in depth-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTreeEntry<'a> {
    pub task: &'a TaskSpec,
    /// Zero for roots.
    pub depth: usize,
    pub has_children: bool,
}

/// Flatten the task forest into depth-first order.
///
/// A task is a root when it has no parent or its parent is not part of the
/// given slice. Siblings keep the order in which they appear in the slice.
/// Callers must pass an acyclic set; the manifest loader guarantees that.
pub fn build_task_forest(tasks: &[TaskSpec]) -> Vec<TaskTreeEntry<'_>> {
    let known: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut roots = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        match task.parent_id.as_deref().and_then(|p| known.get(p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    let mut entries = Vec::with_capacity(tasks.len());
    let mut stack: Vec<(usize, usize)> = roots.into_iter().rev().map(|i| (i, 0)).collect();
    while let Some((index, depth)) = stack.pop() {
        let kids = &children[index];
        entries.push(TaskTreeEntry {
            task: &tasks[index],
            depth,
            has_children: !kids.is_empty(),
        });
        stack.extend(kids.iter().rev().map(|&i| (i, depth + 1)));
    }
    entries
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Find the first parent-link cycle, returned as the id path that closes it.
///
/// Every task is walked at most once, so the check is linear in the number
/// of tasks.
pub fn find_parent_cycle(tasks: &[TaskSpec]) -> Option<Vec<String>> {
    let parents: HashMap<&str, &str> = tasks
        .iter()
        .filter_map(|t| t.parent_id.as_deref().map(|p| (t.id.as_str(), p)))
        .collect();
    let mut state: HashMap<&str, Visit> = HashMap::with_capacity(tasks.len());

    for task in tasks {
        if state.contains_key(task.id.as_str()) {
            continue;
        }
        let mut path = vec![task.id.as_str()];
        state.insert(task.id.as_str(), Visit::InProgress);
        let mut current = task.id.as_str();

        while let Some(&parent) = parents.get(current) {
            match state.get(parent) {
                Some(Visit::Done) => break,
                Some(Visit::InProgress) => {
                    let pos = path.iter().position(|&id| id == parent)?;
                    let mut cycle: Vec<String> =
                        path[pos..].iter().map(|s| (*s).to_string()).collect();
                    cycle.push(parent.to_string());
                    return Some(cycle);
                }
                None => {
                    state.insert(parent, Visit::InProgress);
                    path.push(parent);
                    current = parent;
                }
            }
        }

        for id in path {
            state.insert(id, Visit::Done);
        }
    }
    None
}
