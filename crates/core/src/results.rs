//! Result types for pipeline operations
//!
//! This module contains the structures returned by the executor and the
//! pipeline facade, kept in one place for the CLI layer to render.

use std::time::Duration;

use crate::tasks::{CompositeKind, Outcome, TaskDefinition};
use crate::types::{BatonError, BatonResult};

/// Per-run lifecycle of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Leaf,
    Sequence,
    Parallel,
}

impl From<CompositeKind> for TaskKind {
    fn from(kind: CompositeKind) -> Self {
        match kind {
            CompositeKind::Sequence => TaskKind::Sequence,
            CompositeKind::Parallel => TaskKind::Parallel,
        }
    }
}

/// What happened to one node of the expanded task tree
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub name: String,
    pub kind: TaskKind,
    pub state: TaskState,
    pub elapsed: Duration,
    pub children: Vec<TaskReport>,
}

impl TaskReport {
    pub(crate) fn pending(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            kind,
            state: TaskState::Pending,
            elapsed: Duration::ZERO,
            children: Vec::new(),
        }
    }

    /// Depth-first search for a node by name
    pub fn find(&self, name: &str) -> Option<&TaskReport> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Result of running one top-level task
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    pub root: TaskReport,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Turn a failed outcome into [`BatonError::TaskFailure`]
    pub fn into_result(self) -> BatonResult<()> {
        match self.outcome {
            Outcome::Success => Ok(()),
            Outcome::Failure(failures) => Err(BatonError::TaskFailure(failures)),
        }
    }
}

/// Information about a registered task
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub kind: TaskKind,
    pub description: Option<String>,
    pub members: Vec<String>,
    pub selected_by: Option<String>,
}

impl From<&TaskDefinition> for TaskInfo {
    fn from(definition: &TaskDefinition) -> Self {
        match definition {
            TaskDefinition::Leaf(task) => Self {
                name: task.name().to_string(),
                kind: TaskKind::Leaf,
                description: task.description().map(str::to_string),
                members: Vec::new(),
                selected_by: None,
            },
            TaskDefinition::Composite(composite) => Self {
                name: composite.name.clone(),
                kind: composite.kind.into(),
                description: composite.description.clone(),
                members: composite.member_labels(),
                selected_by: composite.selected_by.clone(),
            },
        }
    }
}

/// Result of listing the tasks of a pipeline
#[derive(Debug)]
pub struct TaskListResult {
    pub pipeline_name: Option<String>,
    pub default_task: String,
    pub tasks: Vec<TaskInfo>,
}
