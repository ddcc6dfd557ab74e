use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{BatonError, BatonResult};

/// File name looked up at the workspace root
pub const PIPELINE_FILE_NAME: &str = "baton.yml";

/// Top-level task run when none is named
pub const DEFAULT_TASK_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

/// An entry of a `sequence` or `parallel` list: a task name, or an anonymous
/// nested group such as `{ parallel: [build-es, build-lib] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MemberConfig {
    Name(String),
    Group(GroupConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupConfig {
    pub sequence: Option<Vec<MemberConfig>>,
    pub parallel: Option<Vec<MemberConfig>>,
}

impl MemberConfig {
    /// Every task name this entry refers to, nested groups included
    pub fn collect_names(&self, names: &mut Vec<String>) {
        match self {
            MemberConfig::Name(name) => names.push(name.clone()),
            MemberConfig::Group(group) => {
                for member in group.sequence.iter().chain(group.parallel.iter()).flatten() {
                    member.collect_names(names);
                }
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    /// Shell string, or an executable followed by its arguments
    pub command: Option<Command>,
    /// Script path, relative to the workspace root unless absolute
    pub script: Option<String>,
    /// Members run one at a time, stopping at the first failure
    pub sequence: Option<Vec<MemberConfig>>,
    /// Members run concurrently; every member finishes before reporting
    pub parallel: Option<Vec<MemberConfig>>,
    /// Alternative shapes selected by execution context flags, first match wins
    pub variants: Option<Vec<VariantConfig>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariantConfig {
    /// Environment signal that must be set for this variant to apply
    pub when: String,
    pub sequence: Option<Vec<MemberConfig>>,
    pub parallel: Option<Vec<MemberConfig>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineFileConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Task run when none is given on the command line
    pub default: Option<String>,
    pub tasks: Vec<TaskConfig>,
}

impl PipelineFileConfig {
    pub fn default_task(&self) -> &str {
        self.default.as_deref().unwrap_or(DEFAULT_TASK_NAME)
    }

    /// Every context flag some variant depends on, sorted and deduplicated
    pub fn signals(&self) -> Vec<String> {
        let mut signals: Vec<String> = self
            .tasks
            .iter()
            .flat_map(|task| task.variants.iter().flatten())
            .map(|variant| variant.when.clone())
            .collect();
        signals.sort();
        signals.dedup();
        signals
    }
}

pub fn parse_pipeline_config(yaml_str: &str) -> BatonResult<PipelineFileConfig> {
    let config: PipelineFileConfig = serde_yaml::from_str(yaml_str)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &PipelineFileConfig) -> BatonResult<()> {
    for task in &config.tasks {
        let shapes = [
            task.command.is_some(),
            task.script.is_some(),
            task.sequence.is_some(),
            task.parallel.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        if shapes != 1 {
            return Err(BatonError::Config(format!(
                "Task '{}' must define exactly one of command, script, sequence or parallel",
                task.name
            )));
        }

        for member in task.sequence.iter().chain(task.parallel.iter()).flatten() {
            validate_member(&task.name, member)?;
        }

        let Some(variants) = &task.variants else {
            continue;
        };
        if task.sequence.is_none() && task.parallel.is_none() {
            return Err(BatonError::Config(format!(
                "Task '{}' declares variants but is not a sequence or parallel task",
                task.name
            )));
        }
        for variant in variants {
            if variant.sequence.is_some() == variant.parallel.is_some() {
                return Err(BatonError::Config(format!(
                    "Variant '{}' of task '{}' must define exactly one of sequence or parallel",
                    variant.when, task.name
                )));
            }
            for member in variant.sequence.iter().chain(variant.parallel.iter()).flatten() {
                validate_member(&task.name, member)?;
            }
        }
    }
    Ok(())
}

fn validate_member(task_name: &str, member: &MemberConfig) -> BatonResult<()> {
    let MemberConfig::Group(group) = member else {
        return Ok(());
    };
    if group.sequence.is_some() == group.parallel.is_some() {
        return Err(BatonError::Config(format!(
            "Inline group in task '{}' must define exactly one of sequence or parallel",
            task_name
        )));
    }
    for nested in group.sequence.iter().chain(group.parallel.iter()).flatten() {
        validate_member(task_name, nested)?;
    }
    Ok(())
}
