//! Command-backed leaf actions
//!
//! This module adapts external programs (shell commands, scripts, executables
//! with args) to the [`TaskAction`] contract: the process runs in the workspace
//! root and its exit status becomes the task's success or failure.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use futures::FutureExt;
use tokio::process::Command;

use crate::platform::ShellInfo;
use crate::tasks::{ActionFuture, TaskAction};

/// What a command-backed task launches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// A single string interpreted by the platform shell
    Shell(String),
    /// An executable followed by its arguments
    Args(Vec<String>),
    /// A script file, relative paths resolved against the workspace root
    Script(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CommandAction {
    spec: CommandSpec,
}

impl CommandAction {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }
}

impl TaskAction for CommandAction {
    fn invoke(&self, workspace_root: &Path) -> ActionFuture {
        let spec = self.spec.clone();
        let workspace_root = workspace_root.to_path_buf();
        async move { execute_spec(&spec, &workspace_root).await }.boxed()
    }
}

async fn execute_spec(spec: &CommandSpec, workspace_root: &Path) -> anyhow::Result<()> {
    match spec {
        CommandSpec::Shell(cmd) => {
            let command = ShellInfo::current().command(cmd);
            execute_command(command, workspace_root, &format!("Command '{}'", cmd)).await
        }
        CommandSpec::Args(args) => {
            let Some((program, rest)) = args.split_first() else {
                return Ok(());
            };
            let mut command = Command::new(program);
            command.args(rest);
            execute_command(command, workspace_root, &format!("Command '{}'", program)).await
        }
        CommandSpec::Script(script_path) => {
            let full_script_path = if script_path.is_relative() {
                workspace_root.join(script_path)
            } else {
                script_path.clone()
            };

            if !full_script_path.exists() {
                bail!("Script file '{}' not found", full_script_path.display());
            }

            let command = Command::new(&full_script_path);
            execute_command(
                command,
                workspace_root,
                &format!("Script '{}'", full_script_path.display()),
            )
            .await
        }
    }
}

async fn execute_command(
    mut command: Command,
    workspace_root: &Path,
    description: &str,
) -> anyhow::Result<()> {
    command.current_dir(workspace_root);

    let status = command
        .status()
        .await
        .with_context(|| format!("Failed to execute {}", description))?;

    if !status.success() {
        bail!(
            "{} failed with exit code {}",
            description,
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}
