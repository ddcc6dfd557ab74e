//! Baton Core Library
//!
//! This is the core library for the Baton build pipeline runner. It provides
//! the task registry, the sequence and parallel combinators, the execution
//! context used to pick environment-specific task shapes, and the executor.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`pipeline`] - High-level interface: load, register, run
//! - [`registry`] - Task registration with eager reference checks
//! - [`execution`] - Executor and command-backed leaf actions
//! - [`registration`] - Registration phase driven by the pipeline file and context
//! - [`context`] - Snapshot of environment signals
//! - [`graph`] - Declaration ordering and cycle detection for pipeline files
//! - [`tasks`] - Task data model and color management
//! - [`configs`] - Pipeline file parsing
//! - [`results`] - Result types for runs and listings
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! Tasks can be registered directly and run through an [`Executor`]:
//!
//! ```rust,no_run
//! use baton_core::{Executor, Task, TaskRegistry};
//!
//! # async fn example() -> baton_core::types::BatonResult<()> {
//! let mut registry = TaskRegistry::new();
//! registry.register(Task::from_fn("clean", |_| async { anyhow::Ok(()) }))?;
//! registry.register(Task::from_fn("lint", |_| async { anyhow::Ok(()) }))?;
//! registry.compose_sequence("default", ["clean", "lint"])?;
//!
//! let executor = Executor::new(registry.freeze(), ".");
//! let report = executor.run("default").await?;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod context;
pub mod execution;
pub mod graph;
pub mod pipeline;
pub mod platform;
pub mod registration;
pub mod registry;
pub mod results;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use context::ExecutionContext;
pub use execution::Executor;
pub use pipeline::{Pipeline, PipelineOptions};
pub use registry::{Registry, TaskRegistry};
pub use tasks::{CompositeKind, CompositeTask, Member, Outcome, Task, TaskDefinition};
pub use types::{BatonError, BatonResult};
