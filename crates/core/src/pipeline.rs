//! High-level pipeline interface
//!
//! This module provides the [`Pipeline`] which serves as the primary interface
//! for the CLI. It runs the whole startup sequence in one place:
//!
//! - Loading and validating the pipeline file
//! - Snapshotting the execution context from the environment
//! - Registering every task and freezing the registry
//!
//! ## Example
//!
//! ```rust,no_run
//! use baton_core::pipeline::{Pipeline, PipelineOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> baton_core::types::BatonResult<()> {
//! let pipeline = Pipeline::load(PipelineOptions {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//! })?;
//!
//! let report = pipeline.run(pipeline.default_task()).await?;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use crate::configs::pipeline::{parse_pipeline_config, PipelineFileConfig, PIPELINE_FILE_NAME};
use crate::context::ExecutionContext;
use crate::execution::runner::Executor;
use crate::registration::register_pipeline;
use crate::results::{RunReport, TaskInfo, TaskListResult};
use crate::types::{BatonError, BatonResult};

/// Options for loading a pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub workspace_root: PathBuf,
    /// Pipeline file; defaults to `baton.yml` in the workspace root
    pub config_path: Option<PathBuf>,
}

/// A fully registered pipeline, ready to run
#[derive(Debug)]
pub struct Pipeline {
    pub config: PipelineFileConfig,
    pub context: ExecutionContext,
    executor: Executor,
}

impl Pipeline {
    /// Load the pipeline file and run the registration phase, reading the
    /// context signals from the process environment
    pub fn load(options: PipelineOptions) -> BatonResult<Self> {
        let config_path = options
            .config_path
            .clone()
            .unwrap_or_else(|| options.workspace_root.join(PIPELINE_FILE_NAME));
        let config = Self::load_config(&config_path)?;
        let context = ExecutionContext::from_env(config.signals());
        Self::from_config(config, context, options.workspace_root)
    }

    /// Build a pipeline from an already parsed file and an explicit context
    pub fn from_config(
        config: PipelineFileConfig,
        context: ExecutionContext,
        workspace_root: impl Into<PathBuf>,
    ) -> BatonResult<Self> {
        let registry = register_pipeline(&config, &context)?;
        let executor = Executor::new(registry.freeze(), workspace_root);
        Ok(Self {
            config,
            context,
            executor,
        })
    }

    pub fn default_task(&self) -> &str {
        self.config.default_task()
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub async fn run(&self, task_name: &str) -> BatonResult<RunReport> {
        self.executor.run(task_name).await
    }

    /// List every registered task in declaration order
    pub fn list_tasks(&self) -> TaskListResult {
        let registry = self.executor.registry();
        let tasks = self
            .config
            .tasks
            .iter()
            .filter_map(|task| registry.resolve(&task.name).ok())
            .map(TaskInfo::from)
            .collect();

        TaskListResult {
            pipeline_name: self.config.name.clone(),
            default_task: self.default_task().to_string(),
            tasks,
        }
    }

    fn load_config(config_path: &Path) -> BatonResult<PipelineFileConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            BatonError::Config(format!(
                "Failed to read pipeline file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_pipeline_config(&content).map_err(|e| match e {
            BatonError::Yaml(err) => BatonError::Config(format!(
                "Failed to parse pipeline file {}: {}",
                config_path.display(),
                err
            )),
            other => other,
        })
    }
}
