//! Registration phase
//!
//! Turns a parsed pipeline file into a populated [`TaskRegistry`]. The
//! [`ExecutionContext`] is consulted here and nowhere else: for each task with
//! variants, exactly one shape is chosen and registered under the task's name.

use std::path::PathBuf;

use crate::configs::pipeline::{Command, MemberConfig, PipelineFileConfig, TaskConfig};
use crate::context::ExecutionContext;
use crate::execution::command::{CommandAction, CommandSpec};
use crate::graph::{registration_order, DefinitionNode};
use crate::registry::TaskRegistry;
use crate::tasks::{CompositeKind, CompositeTask, Member, Task};
use crate::types::{BatonError, BatonResult};

/// The shape a task takes once the context has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedShape {
    Command(CommandSpec),
    Composite {
        kind: CompositeKind,
        members: Vec<MemberConfig>,
        selected_by: Option<String>,
    },
}

impl ResolvedShape {
    /// Names referenced anywhere in the shape, nested groups flattened
    fn member_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let ResolvedShape::Composite { members, .. } = self {
            for member in members {
                member.collect_names(&mut names);
            }
        }
        names
    }
}

impl From<&MemberConfig> for Member {
    fn from(config: &MemberConfig) -> Self {
        match config {
            MemberConfig::Name(name) => Member::Named(name.clone()),
            MemberConfig::Group(group) => match (&group.sequence, &group.parallel) {
                (Some(members), _) => Member::sequence(members.iter().map(Member::from)),
                (None, Some(members)) => Member::parallel(members.iter().map(Member::from)),
                (None, None) => Member::sequence(Vec::<Member>::new()),
            },
        }
    }
}

/// Pick the shape of a task for the given context: the first variant whose
/// flag is set, otherwise the base definition
pub fn resolve_shape(task: &TaskConfig, context: &ExecutionContext) -> BatonResult<ResolvedShape> {
    if let Some(variant) = task
        .variants
        .iter()
        .flatten()
        .find(|variant| context.flag(&variant.when))
    {
        tracing::debug!(task = %task.name, flag = %variant.when, "selected variant");
        return composite_shape(
            &task.name,
            variant.sequence.as_ref(),
            variant.parallel.as_ref(),
            Some(variant.when.clone()),
        );
    }

    if let Some(command) = &task.command {
        let spec = match command {
            Command::Single(cmd) => CommandSpec::Shell(cmd.clone()),
            Command::Multiple(args) => CommandSpec::Args(args.clone()),
        };
        return Ok(ResolvedShape::Command(spec));
    }
    if let Some(script) = &task.script {
        return Ok(ResolvedShape::Command(CommandSpec::Script(PathBuf::from(
            script,
        ))));
    }
    composite_shape(
        &task.name,
        task.sequence.as_ref(),
        task.parallel.as_ref(),
        None,
    )
}

fn composite_shape(
    name: &str,
    sequence: Option<&Vec<MemberConfig>>,
    parallel: Option<&Vec<MemberConfig>>,
    selected_by: Option<String>,
) -> BatonResult<ResolvedShape> {
    let (kind, members) = match (sequence, parallel) {
        (Some(members), None) => (CompositeKind::Sequence, members.clone()),
        (None, Some(members)) => (CompositeKind::Parallel, members.clone()),
        _ => {
            return Err(BatonError::Config(format!(
                "Task '{}' must define exactly one of sequence or parallel",
                name
            )))
        }
    };
    Ok(ResolvedShape::Composite {
        kind,
        members,
        selected_by,
    })
}

/// Populate a registry from a pipeline file.
///
/// Nothing is registered unless the whole file resolves: duplicates, unknown
/// members and cycles are all reported before the registry is returned.
pub fn register_pipeline(
    config: &PipelineFileConfig,
    context: &ExecutionContext,
) -> BatonResult<TaskRegistry> {
    let mut shapes = Vec::with_capacity(config.tasks.len());
    for task in &config.tasks {
        shapes.push((task, resolve_shape(task, context)?));
    }

    let nodes: Vec<DefinitionNode> = shapes
        .iter()
        .map(|(task, shape)| DefinitionNode::new(task.name.clone(), shape.member_names()))
        .collect();
    let order = registration_order(&nodes)?;

    let mut registry = TaskRegistry::new();
    for name in order {
        let Some((task, shape)) = shapes.iter().find(|(task, _)| task.name == name) else {
            continue;
        };
        match shape {
            ResolvedShape::Command(spec) => {
                let mut leaf = Task::new(&task.name, CommandAction::new(spec.clone()));
                if let Some(description) = &task.description {
                    leaf = leaf.with_description(description);
                }
                registry.register(leaf)?;
            }
            ResolvedShape::Composite {
                kind,
                members,
                selected_by,
            } => {
                let mut composite = CompositeTask::new(
                    &task.name,
                    *kind,
                    members.iter().map(Member::from).collect(),
                );
                composite.description = task.description.clone();
                composite.selected_by = selected_by.clone();
                registry.compose(composite)?;
            }
        }
    }

    if let Some(default) = &config.default {
        if !registry.contains(default) {
            return Err(BatonError::Config(format!(
                "Default task '{}' is not defined",
                default
            )));
        }
    }

    tracing::debug!(tasks = registry.len(), "registration complete");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::pipeline::parse_pipeline_config;
    use crate::tasks::TaskDefinition;

    const PIPELINE: &str = r#"
tasks:
  - name: default
    sequence: [clean, build, test]
  - name: test
    description: Run the test suites
    sequence: [nodeTests]
    variants:
      - when: APPVEYOR
        sequence: [nodeTests, browserTests]
  - name: build
    parallel: [build-es, build-lib]
  - name: clean
    command: rm -rf lib es
  - name: build-es
    command: [tsc, --module, es2015]
  - name: build-lib
    script: scripts/build-lib.sh
  - name: nodeTests
    command: mocha
  - name: browserTests
    command: karma start
"#;

    fn members_of(registry: &TaskRegistry, name: &str) -> Vec<String> {
        match registry.resolve(name).unwrap() {
            TaskDefinition::Composite(composite) => composite.member_labels(),
            TaskDefinition::Leaf(_) => Vec::new(),
        }
    }

    #[test]
    fn test_base_shape_without_flag() {
        let config = parse_pipeline_config(PIPELINE).unwrap();
        let registry = register_pipeline(&config, &ExecutionContext::default()).unwrap();

        assert_eq!(registry.len(), 8);
        assert_eq!(members_of(&registry, "test"), vec!["nodeTests"]);
        match registry.resolve("test").unwrap() {
            TaskDefinition::Composite(composite) => {
                assert_eq!(composite.selected_by, None);
                assert_eq!(composite.description.as_deref(), Some("Run the test suites"));
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_selected_by_flag() {
        let config = parse_pipeline_config(PIPELINE).unwrap();
        let context = ExecutionContext::from_flags([("APPVEYOR", true)]);
        let registry = register_pipeline(&config, &context).unwrap();

        assert_eq!(members_of(&registry, "test"), vec!["nodeTests", "browserTests"]);
        match registry.resolve("test").unwrap() {
            TaskDefinition::Composite(composite) => {
                assert_eq!(composite.selected_by.as_deref(), Some("APPVEYOR"));
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_first_matching_variant_wins() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: a
    command: "true"
  - name: b
    command: "true"
  - name: test
    sequence: [a]
    variants:
      - when: TRAVIS
        parallel: [a, b]
      - when: APPVEYOR
        sequence: [b]
"#,
        )
        .unwrap();
        let context = ExecutionContext::from_flags([("TRAVIS", true), ("APPVEYOR", true)]);
        let registry = register_pipeline(&config, &context).unwrap();

        match registry.resolve("test").unwrap() {
            TaskDefinition::Composite(composite) => {
                assert_eq!(composite.kind, CompositeKind::Parallel);
                assert_eq!(composite.selected_by.as_deref(), Some("TRAVIS"));
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_command_shapes() {
        let config = parse_pipeline_config(PIPELINE).unwrap();
        let find = |name: &str| config.tasks.iter().find(|t| t.name == name).unwrap();
        let context = ExecutionContext::default();

        assert_eq!(
            resolve_shape(find("clean"), &context).unwrap(),
            ResolvedShape::Command(CommandSpec::Shell("rm -rf lib es".to_string()))
        );
        assert_eq!(
            resolve_shape(find("build-lib"), &context).unwrap(),
            ResolvedShape::Command(CommandSpec::Script(PathBuf::from("scripts/build-lib.sh")))
        );
    }

    #[test]
    fn test_variant_members_are_checked() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: nodeTests
    command: mocha
  - name: test
    sequence: [nodeTests]
    variants:
      - when: APPVEYOR
        sequence: [nodeTests, karma]
"#,
        )
        .unwrap();

        assert!(register_pipeline(&config, &ExecutionContext::default()).is_ok());

        let context = ExecutionContext::from_flags([("APPVEYOR", true)]);
        let err = register_pipeline(&config, &context).unwrap_err();
        assert!(matches!(err, BatonError::UnresolvedReference { ref member, .. } if member == "karma"));
    }

    #[test]
    fn test_cyclic_file_is_rejected() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: build
    sequence: [test]
  - name: test
    sequence: [build]
"#,
        )
        .unwrap();

        let err = register_pipeline(&config, &ExecutionContext::default()).unwrap_err();
        assert!(matches!(err, BatonError::CyclicDefinition(ref c) if c == "build -> test -> build"));
    }

    #[test]
    fn test_nested_groups_register_as_group_members() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: build
    sequence:
      - lint
      - parallel: [build-es, build-lib]
      - build-test
  - name: lint
    command: eslint src
  - name: build-es
    command: tsc
  - name: build-lib
    command: tsc
  - name: build-test
    command: tsc -p test
"#,
        )
        .unwrap();
        let registry = register_pipeline(&config, &ExecutionContext::default()).unwrap();

        assert_eq!(
            members_of(&registry, "build"),
            vec!["lint", "parallel[build-es, build-lib]", "build-test"]
        );
    }

    #[test]
    fn test_unknown_name_inside_group_is_unresolved() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: lint
    command: eslint src
  - name: build
    sequence: [lint, { parallel: [lint, build-umd] }]
"#,
        )
        .unwrap();

        let err = register_pipeline(&config, &ExecutionContext::default()).unwrap_err();
        assert!(matches!(
            err,
            BatonError::UnresolvedReference { ref composite, ref member }
                if composite == "build" && member == "build-umd"
        ));
    }

    #[test]
    fn test_cycle_through_group_is_rejected() {
        let config = parse_pipeline_config(
            r#"
tasks:
  - name: build
    sequence: [{ parallel: [test] }]
  - name: test
    sequence: [build]
"#,
        )
        .unwrap();

        let err = register_pipeline(&config, &ExecutionContext::default()).unwrap_err();
        assert!(matches!(err, BatonError::CyclicDefinition(ref c) if c == "build -> test -> build"));
    }

    #[test]
    fn test_explicit_default_must_be_defined() {
        let config = parse_pipeline_config(
            r#"
default: ci
tasks:
  - name: lint
    command: eslint src
"#,
        )
        .unwrap();

        let err = register_pipeline(&config, &ExecutionContext::default()).unwrap_err();
        assert!(matches!(err, BatonError::Config(ref m) if m == "Default task 'ci' is not defined"));
    }
}
