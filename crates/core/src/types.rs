use std::fmt;

use thiserror::Error;

/// The main error type for Baton operations
#[derive(Debug, Error)]
pub enum BatonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task '{0}' is already registered")]
    DuplicateName(String),

    #[error("Task '{composite}' references '{member}' which is not registered")]
    UnresolvedReference { composite: String, member: String },

    #[error("Circular task definition detected: {0}")]
    CyclicDefinition(String),

    #[error("Task '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    TaskFailure(Failures),
}

/// Result type alias for Baton operations
pub type BatonResult<T> = Result<T, BatonError>;

/// Error detail surfaced by a failing leaf task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Name of the leaf task whose action failed
    pub task: String,
    pub detail: String,
}

impl TaskFailure {
    pub fn new(task: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task '{}' failed: {}", self.task, self.detail)
    }
}

/// Every failure detail collected by a run, in the order they were observed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failures(pub Vec<TaskFailure>);

impl Failures {
    pub fn iter(&self) -> std::slice::Iter<'_, TaskFailure> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}
