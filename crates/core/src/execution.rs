//! Task execution module
//!
//! This module handles the actual execution of tasks: the command-backed leaf
//! actions and the executor that expands composites.

pub mod command;
pub mod runner;

pub use command::{CommandAction, CommandSpec};
pub use runner::Executor;
