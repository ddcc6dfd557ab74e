//! Task registry
//!
//! [`TaskRegistry`] is the mutable builder used during the registration phase.
//! Member references are checked eagerly, so a broken graph is rejected before
//! anything runs. [`TaskRegistry::freeze`] turns it into a read-only
//! [`Registry`] that the executor owns.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tasks::{CompositeKind, CompositeTask, Member, Task, TaskDefinition};
use crate::types::{BatonError, BatonResult};

#[derive(Debug, Default)]
pub struct TaskRegistry {
    definitions: HashMap<String, TaskDefinition>,
    order: Vec<String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf task under its own name
    pub fn register(&mut self, task: Task) -> BatonResult<()> {
        self.ensure_available(task.name())?;
        tracing::debug!(task = task.name(), "registered task");
        self.insert(TaskDefinition::Leaf(task));
        Ok(())
    }

    pub fn compose_sequence<I, S>(&mut self, name: &str, members: I) -> BatonResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compose_sequence_with(name, members.into_iter().map(|m| Member::Named(m.into())))
    }

    pub fn compose_parallel<I, S>(&mut self, name: &str, members: I) -> BatonResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compose_parallel_with(name, members.into_iter().map(|m| Member::Named(m.into())))
    }

    /// Compose a sequence whose members may include inline tasks
    pub fn compose_sequence_with<I>(&mut self, name: &str, members: I) -> BatonResult<()>
    where
        I: IntoIterator<Item = Member>,
    {
        self.compose(CompositeTask::new(
            name,
            CompositeKind::Sequence,
            members.into_iter().collect(),
        ))
    }

    /// Compose a parallel block whose members may include inline tasks
    pub fn compose_parallel_with<I>(&mut self, name: &str, members: I) -> BatonResult<()>
    where
        I: IntoIterator<Item = Member>,
    {
        self.compose(CompositeTask::new(
            name,
            CompositeKind::Parallel,
            members.into_iter().collect(),
        ))
    }

    /// Register a fully built composite.
    ///
    /// Fails without modifying the registry if the name is taken, a member
    /// names the composite itself, or a member is not registered yet.
    pub fn compose(&mut self, composite: CompositeTask) -> BatonResult<()> {
        self.ensure_available(&composite.name)?;
        self.check_members(&composite.name, &composite.members)?;

        tracing::debug!(
            task = %composite.name,
            kind = %composite.kind,
            members = ?composite.member_labels(),
            "composed task"
        );
        self.insert(TaskDefinition::Composite(composite));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> BatonResult<&TaskDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| BatonError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.order.iter().filter_map(|name| self.definitions.get(name))
    }

    /// End the registration phase
    pub fn freeze(self) -> Registry {
        Registry {
            inner: Arc::new(self),
        }
    }

    /// Named members, including those nested in inline groups, must already
    /// be registered and must not be the composite itself
    fn check_members(&self, composite: &str, members: &[Member]) -> BatonResult<()> {
        for member in members {
            match member {
                Member::Named(member_name) => {
                    if member_name == composite {
                        return Err(BatonError::CyclicDefinition(format!(
                            "{} -> {}",
                            composite, composite
                        )));
                    }
                    if !self.definitions.contains_key(member_name) {
                        return Err(BatonError::UnresolvedReference {
                            composite: composite.to_string(),
                            member: member_name.clone(),
                        });
                    }
                }
                Member::Inline(_) => {}
                Member::Group { members, .. } => self.check_members(composite, members)?,
            }
        }
        Ok(())
    }

    fn ensure_available(&self, name: &str) -> BatonResult<()> {
        if self.definitions.contains_key(name) {
            return Err(BatonError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, definition: TaskDefinition) {
        let name = definition.name().to_string();
        self.order.push(name.clone());
        self.definitions.insert(name, definition);
    }
}

/// Frozen, shareable view of a [`TaskRegistry`]
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<TaskRegistry>,
}

impl Registry {
    pub fn resolve(&self, name: &str) -> BatonResult<&TaskDefinition> {
        self.inner.resolve(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.inner.definitions()
    }
}
