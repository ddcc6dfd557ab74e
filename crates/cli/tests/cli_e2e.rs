//! End-to-end CLI tests using `assert_cmd`
#![cfg(unix)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cargo_bin() -> Command {
    let mut cmd =
        Command::cargo_bin("baton").unwrap_or_else(|err| panic!("Binary not found: {err}"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn workspace(yaml: &str) -> TempDir {
    let temp = TempDir::new().unwrap_or_else(|err| panic!("Failed to create temp dir: {err}"));
    fs::write(temp.path().join("baton.yml"), yaml).unwrap();
    temp
}

fn in_workspace(root: &Path) -> Command {
    let mut cmd = cargo_bin();
    cmd.current_dir(root);
    cmd
}

const PIPELINE: &str = r#"
tasks:
  - name: a
    command: exit 4
  - name: b
    command: echo b > b.log
  - name: build
    parallel: [a, b]
  - name: ok
    command: "true"
"#;

#[test]
fn test_cli_help() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_failing_member_exits_with_code_one() {
    let temp = workspace(PIPELINE);

    in_workspace(temp.path())
        .args(["run", "build"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: Task 'a' failed: Command 'exit 4' failed with exit code 4",
        ));

    // The sibling still ran to completion
    assert!(temp.path().join("b.log").exists());
}

#[test]
fn test_successful_task_exits_with_code_zero() {
    let temp = workspace(PIPELINE);

    in_workspace(temp.path())
        .args(["run", "ok"])
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("'ok' completed"));
}

#[test]
fn test_unknown_task_is_reported() {
    let temp = workspace(PIPELINE);

    in_workspace(temp.path())
        .args(["run", "deploy"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Task 'deploy' not found"));
}

#[test]
fn test_undefined_default_fails_to_load() {
    let temp = workspace("default: nope\ntasks:\n  - name: ok\n    command: \"true\"\n");

    in_workspace(temp.path())
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Default task 'nope' is not defined"));
}

#[test]
fn test_workspace_flag_points_at_pipeline() {
    let temp = workspace(PIPELINE);
    let elsewhere = TempDir::new().unwrap();

    in_workspace(elsewhere.path())
        .arg("--workspace")
        .arg(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("parallel: a, b"));
}
