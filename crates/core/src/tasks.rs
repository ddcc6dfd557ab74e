//! Task data model and color management
//!
//! This module defines the units the registry stores: leaf [`Task`]s wrapping
//! an external collaborator, [`CompositeTask`]s grouping other tasks as a
//! sequence or a parallel block, and the terminal [`Outcome`] of running either.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::*;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::types::{Failures, TaskFailure};

/// Terminal result of running a task. There are no intermediate outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(Failures),
}

impl Outcome {
    pub fn failure(task: impl Into<String>, detail: impl Into<String>) -> Self {
        Outcome::Failure(Failures(vec![TaskFailure::new(task, detail)]))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Failure details carried by this outcome, empty on success
    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            Outcome::Success => &[],
            Outcome::Failure(failures) => &failures.0,
        }
    }
}

/// Future returned by a leaf action
pub type ActionFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A call into an external collaborator (compiler, linter, test runner...).
///
/// The engine only looks at whether the returned future resolves to `Ok` or
/// `Err`; the error chain becomes the failure detail.
pub trait TaskAction: Send + Sync {
    fn invoke(&self, workspace_root: &Path) -> ActionFuture;
}

/// Adapter turning an async closure into a [`TaskAction`]
pub struct FnAction<F>(F);

impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(PathBuf) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn invoke(&self, workspace_root: &Path) -> ActionFuture {
        (self.0)(workspace_root.to_path_buf()).boxed()
    }
}

/// A named leaf unit of work
#[derive(Clone)]
pub struct Task {
    name: String,
    description: Option<String>,
    action: Arc<dyn TaskAction>,
}

impl Task {
    pub fn new(name: impl Into<String>, action: impl TaskAction + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            action: Arc::new(action),
        }
    }

    /// Build a task from an async closure receiving the workspace root
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, FnAction(f))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn invoke(&self, workspace_root: &Path) -> ActionFuture {
        self.action.invoke(workspace_root)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Sequence,
    Parallel,
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeKind::Sequence => f.write_str("sequence"),
            CompositeKind::Parallel => f.write_str("parallel"),
        }
    }
}

/// A constituent of a composite: a registered name, an anonymous leaf, or an
/// anonymous sequence/parallel group, all owned by the composite itself
#[derive(Debug, Clone)]
pub enum Member {
    Named(String),
    Inline(Task),
    Group {
        kind: CompositeKind,
        members: Vec<Member>,
    },
}

impl Member {
    pub fn sequence<I, M>(members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Member>,
    {
        Member::Group {
            kind: CompositeKind::Sequence,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parallel<I, M>(members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Member>,
    {
        Member::Group {
            kind: CompositeKind::Parallel,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Display name; groups render as e.g. `parallel[build-es, build-lib]`
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Member::Named(name) => Cow::Borrowed(name),
            Member::Inline(task) => Cow::Borrowed(task.name()),
            Member::Group { kind, members } => Cow::Owned(format!(
                "{}[{}]",
                kind,
                members
                    .iter()
                    .map(|m| m.label().into_owned())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

impl From<&str> for Member {
    fn from(name: &str) -> Self {
        Member::Named(name.to_string())
    }
}

impl From<String> for Member {
    fn from(name: String) -> Self {
        Member::Named(name)
    }
}

impl From<Task> for Member {
    fn from(task: Task) -> Self {
        Member::Inline(task)
    }
}

/// A named sequence or parallel grouping of other tasks
#[derive(Debug, Clone)]
pub struct CompositeTask {
    pub name: String,
    pub kind: CompositeKind,
    pub members: Vec<Member>,
    pub description: Option<String>,
    /// Context flag that selected this definition, if it came from a variant
    pub selected_by: Option<String>,
}

impl CompositeTask {
    pub fn new(name: impl Into<String>, kind: CompositeKind, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            kind,
            members,
            description: None,
            selected_by: None,
        }
    }

    pub fn member_labels(&self) -> Vec<String> {
        self.members.iter().map(|m| m.label().into_owned()).collect()
    }
}

/// Anything that can be registered under a name
#[derive(Debug, Clone)]
pub enum TaskDefinition {
    Leaf(Task),
    Composite(CompositeTask),
}

impl TaskDefinition {
    pub fn name(&self) -> &str {
        match self {
            TaskDefinition::Leaf(task) => task.name(),
            TaskDefinition::Composite(composite) => &composite.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TaskDefinition::Leaf(task) => task.description(),
            TaskDefinition::Composite(composite) => composite.description.as_deref(),
        }
    }
}

/// Get a consistent color for a task name
pub fn get_task_color(task_name: &str) -> Color {
    let hash = task_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones, kept clear of the red/green used for outcomes
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
