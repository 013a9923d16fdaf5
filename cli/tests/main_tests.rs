//! # vmctl CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//! Author: Christi Mahu
//!
//! Top-level behavior: `--help`, `--version`, unknown commands and the
//! "no configuration" path shared by every command that needs one.
//!
mod common;
use common::*;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_help_lists_commands() {
    vmctl_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("snapshots"))
        .stdout(predicate::str::contains("secrets"));
}

#[test]
fn test_version_flag() {
    vmctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails() {
    vmctl_cmd().arg("frobnicate").assert().failure();
}

#[test]
fn test_commands_require_config() {
    let env = TestEnv::new();
    for command in ["start", "stop", "status", "snapshots", "provision", "ps"] {
        env.cmd()
            .arg(command)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(
                "Error: No configuration found. Run 'vmctl config' first.",
            ));
    }
}

#[test]
fn test_legacy_directory_hint() {
    let env = TestEnv::new();
    fs::create_dir(env.home.path().join(".codestation")).unwrap();
    env.cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("vmctl migrate"));
}
