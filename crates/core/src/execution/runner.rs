//! Executor
//!
//! Resolves a named task against a frozen [`Registry`] and drives it to a
//! terminal [`Outcome`]. Sequences run members one at a time and stop at the
//! first failure. Parallel blocks start every member, never cancel siblings,
//! and collect every failure before reporting. Nothing is memoised between
//! runs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use crate::registry::Registry;
use crate::results::{RunReport, TaskKind, TaskReport, TaskState};
use crate::tasks::{CompositeKind, Member, Outcome, Task, TaskDefinition};
use crate::types::{BatonResult, Failures};

/// Runs tasks from a frozen registry
#[derive(Debug, Clone)]
pub struct Executor {
    registry: Registry,
    workspace_root: PathBuf,
}

impl Executor {
    pub fn new(registry: Registry, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            workspace_root: workspace_root.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Run a task to completion.
    ///
    /// Fails with `NotFound` before executing anything if `name` is not
    /// registered. A task failure is reported through the returned outcome,
    /// not as an error.
    pub async fn run(&self, name: &str) -> BatonResult<RunReport> {
        let definition = self.registry.resolve(name)?;
        let (outcome, root) = self.run_definition(definition).await;
        Ok(RunReport { outcome, root })
    }

    async fn run_definition(&self, definition: &TaskDefinition) -> (Outcome, TaskReport) {
        match definition {
            TaskDefinition::Leaf(task) => self.run_leaf(task).await,
            TaskDefinition::Composite(composite) => {
                self.run_composite(&composite.name, composite.kind, &composite.members)
                    .await
            }
        }
    }

    /// Expand a named composite or an inline group
    fn run_composite<'a>(
        &'a self,
        name: &'a str,
        kind: CompositeKind,
        members: &'a [Member],
    ) -> BoxFuture<'a, (Outcome, TaskReport)> {
        async move {
            match kind {
                CompositeKind::Sequence => self.run_sequence(name, members).await,
                CompositeKind::Parallel => self.run_parallel(name, members).await,
            }
        }
        .boxed()
    }

    async fn run_member(&self, member: &Member) -> (Outcome, TaskReport) {
        match member {
            Member::Inline(task) => self.run_leaf(task).await,
            Member::Group { kind, members } => {
                let label = member.label();
                self.run_composite(&label, *kind, members).await
            }
            Member::Named(name) => match self.registry.resolve(name) {
                Ok(definition) => self.run_definition(definition).await,
                // Composition checks members eagerly, so this only guards
                // against a registry assembled outside the builder.
                Err(err) => (
                    Outcome::failure(name.clone(), err.to_string()),
                    TaskReport {
                        state: TaskState::Failed,
                        ..TaskReport::pending(name.clone(), TaskKind::Leaf)
                    },
                ),
            },
        }
    }

    async fn run_leaf(&self, task: &Task) -> (Outcome, TaskReport) {
        let mut report = TaskReport::pending(task.name(), TaskKind::Leaf);
        report.state = TaskState::Running;
        tracing::info!("Starting '{}'...", task.name());

        let started = Instant::now();
        let result = task.invoke(&self.workspace_root).await;
        report.elapsed = started.elapsed();

        let outcome = match result {
            Ok(()) => {
                report.state = TaskState::Succeeded;
                tracing::info!(
                    "Finished '{}' after {} ms",
                    task.name(),
                    report.elapsed.as_millis()
                );
                Outcome::Success
            }
            Err(err) => {
                report.state = TaskState::Failed;
                let detail = format!("{:#}", err);
                tracing::error!(
                    "'{}' errored after {} ms: {}",
                    task.name(),
                    report.elapsed.as_millis(),
                    detail
                );
                Outcome::failure(task.name(), detail)
            }
        };
        (outcome, report)
    }

    async fn run_sequence(&self, name: &str, members: &[Member]) -> (Outcome, TaskReport) {
        let mut report = TaskReport::pending(name, TaskKind::Sequence);
        report.state = TaskState::Running;
        tracing::debug!(task = %name, "starting sequence");

        let started = Instant::now();
        let mut outcome = Outcome::Success;
        let mut members = members.iter();

        for member in members.by_ref() {
            let (member_outcome, member_report) = self.run_member(member).await;
            report.children.push(member_report);
            if !member_outcome.is_success() {
                outcome = member_outcome;
                break;
            }
        }

        // Members after a failure are never started
        for member in members {
            report
                .children
                .push(TaskReport::pending(member.label(), self.member_kind(member)));
        }

        report.elapsed = started.elapsed();
        report.state = terminal_state(&outcome);
        (outcome, report)
    }

    async fn run_parallel(&self, name: &str, members: &[Member]) -> (Outcome, TaskReport) {
        let mut report = TaskReport::pending(name, TaskKind::Parallel);
        report.state = TaskState::Running;
        tracing::debug!(
            task = %name,
            members = members.len(),
            "starting parallel block"
        );

        let started = Instant::now();
        let results = join_all(members.iter().map(|m| self.run_member(m))).await;

        let mut failures = Vec::new();
        for (member_outcome, member_report) in results {
            if let Outcome::Failure(member_failures) = member_outcome {
                failures.extend(member_failures.0);
            }
            report.children.push(member_report);
        }

        let outcome = if failures.is_empty() {
            Outcome::Success
        } else {
            Outcome::Failure(Failures(failures))
        };

        report.elapsed = started.elapsed();
        report.state = terminal_state(&outcome);
        (outcome, report)
    }

    fn member_kind(&self, member: &Member) -> TaskKind {
        match member {
            Member::Inline(_) => TaskKind::Leaf,
            Member::Group { kind, .. } => (*kind).into(),
            Member::Named(name) => match self.registry.resolve(name) {
                Ok(TaskDefinition::Composite(composite)) => composite.kind.into(),
                _ => TaskKind::Leaf,
            },
        }
    }
}

fn terminal_state(outcome: &Outcome) -> TaskState {
    if outcome.is_success() {
        TaskState::Succeeded
    } else {
        TaskState::Failed
    }
}
