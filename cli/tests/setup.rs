//! # vmctl Setup Command Integration Tests
//!
//! File: cli/tests/setup.rs
//! Author: Christi Mahu
//!
//! These cover the local checks `vmctl setup` makes before contacting the
//! host. The host in the config is unroutable, so any test that got past
//! those checks would fail with a connection error instead.
//!
mod common;
use common::*;
use predicates::prelude::*;

const UNREACHABLE_CONFIG: &str =
    "VM_NAME=\"box\"\nZONE=\"us-central1-a\"\nSSH_HOST=\"192.0.2.1\"\nSSH_PORT=\"1\"\n";

#[test]
fn test_missing_app_fails_before_remote_work() {
    let env = TestEnv::new();
    env.write_config(UNREACHABLE_CONFIG);
    let apps = tempfile::tempdir().unwrap();
    make_apps(apps.path(), &["a"]);

    env.cmd()
        .args(["setup", "--apps", "a,missing-app", "--apps-dir"])
        .arg(apps.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("App 'missing-app' not found"))
        .stdout(predicate::str::contains("Target").not());
}

#[test]
fn test_missing_apps_dir() {
    let env = TestEnv::new();
    env.write_config(UNREACHABLE_CONFIG);
    let apps = tempfile::tempdir().unwrap();

    env.cmd()
        .args(["setup", "--apps-dir"])
        .arg(apps.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Apps directory not found"));
}

#[test]
fn test_apps_dir_from_environment() {
    let env = TestEnv::new();
    env.write_config(UNREACHABLE_CONFIG);
    let apps = tempfile::tempdir().unwrap();
    make_apps(apps.path(), &["web"]);

    env.cmd()
        .env("VMCTL_APPS_DIR", apps.path())
        .args(["setup", "--apps", "nothere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("App 'nothere' not found"));
}

#[test]
fn test_bad_gateway_repo_rejected() {
    let env = TestEnv::new();
    env.write_config(UNREACHABLE_CONFIG);
    let apps = tempfile::tempdir().unwrap();
    make_apps(apps.path(), &["openclaw-gateway"]);

    env.cmd()
        .args(["setup", "--apps", "openclaw-gateway", "--gateway-repo"])
        .arg(apps.path().join("no-repo"))
        .arg("--apps-dir")
        .arg(apps.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--gateway-repo"));
}

#[test]
fn test_valid_plan_still_needs_config() {
    let env = TestEnv::new();
    let apps = tempfile::tempdir().unwrap();
    make_apps(apps.path(), &["web"]);

    env.cmd()
        .args(["setup", "--apps", "web", "--apps-dir"])
        .arg(apps.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration found"));
}
