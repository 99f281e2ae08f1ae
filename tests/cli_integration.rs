//! CLI integration tests.
//!
//! Everything here runs without a container runtime: configuration errors,
//! listing, and the all-checks-disabled shortcut are all decided before the
//! provider is probed.

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the gauntlet binary
fn gauntlet() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("gauntlet"));
    // Scrub ambient ENABLE_*/FAIL_FAST/... so each test controls its own env.
    cmd.env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default());
    cmd
}

/// Environment that disables every builtin check.
const ALL_CHECKS: &[&str] = &[
    "markdown",
    "ruff",
    "mypy",
    "ty",
    "black",
    "bandit",
    "semgrep",
    "safety",
    "terraform",
    "tflint",
    "gitleaks",
];

fn disable_all(cmd: &mut Command) {
    for name in ALL_CHECKS {
        cmd.env(format!("ENABLE_{}", name.to_uppercase()), "false");
    }
}

#[test]
fn test_help_describes_the_tool() {
    gauntlet()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quality checks"))
        .stdout(predicate::str::contains("--sequential"))
        .stdout(predicate::str::contains("--no-fail-fast"));
}

#[test]
fn test_version() {
    gauntlet()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_list_names_every_builtin_check() {
    let assert = gauntlet().arg("--list").assert().success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for name in ALL_CHECKS {
        assert!(output.contains(name), "missing check in listing: {name}");
    }
}

#[test]
fn test_missing_source_directory_is_a_config_error() {
    gauntlet()
        .arg("/definitely/not/a/real/path")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_all_checks_disabled_passes_without_a_runtime() {
    let dir = TempDir::new().unwrap();

    let mut cmd = gauntlet();
    disable_all(&mut cmd);
    cmd.arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No checks enabled"));
}

#[test]
fn test_disabled_run_accepts_mode_flags() {
    let dir = TempDir::new().unwrap();

    let mut cmd = gauntlet();
    disable_all(&mut cmd);
    cmd.arg(dir.path())
        .arg("--sequential")
        .arg("--no-fail-fast")
        .assert()
        .success();
}
