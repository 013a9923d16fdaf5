//! # vmctl Config Command Integration Tests
//!
//! File: cli/tests/config.rs
//! Author: Christi Mahu
//!
mod common;
use common::*;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_show_without_config() {
    let env = TestEnv::new();
    env.cmd()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No configuration found."));
}

#[test]
fn test_no_flags_prints_hints() {
    let env = TestEnv::new();
    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("No options specified"))
        .stdout(predicate::str::contains("vmctl config --show"));
}

#[test]
fn test_update_normalizes_and_persists() {
    let env = TestEnv::new();
    env.cmd()
        .args([
            "config",
            "--vm-name",
            "My-VM-1",
            "--zone",
            "europe-west4-b",
            "--project",
            "acme-dev",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration updated"));

    let saved = env.read_config();
    assert!(saved.contains("VM_NAME=\"my-vm-1\""));
    assert!(saved.contains("ZONE=\"europe-west4-b\""));
    assert!(saved.contains("PROJECT=\"acme-dev\""));
    assert!(!saved.contains("SSH_HOST"));

    env.cmd()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("my-vm-1"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_partial_update_keeps_other_fields() {
    let env = TestEnv::new();
    env.write_config("VM_NAME=\"box\"\nZONE=\"us-east1-c\"\nPROJECT=\"acme\"\n");
    env.cmd()
        .args(["config", "--ssh-host", "203.0.113.7", "--ssh-port", "2222"])
        .assert()
        .success();

    let saved = env.read_config();
    assert!(saved.contains("VM_NAME=\"box\""));
    assert!(saved.contains("PROJECT=\"acme\""));
    assert!(saved.contains("SSH_HOST=\"203.0.113.7\""));
    assert!(saved.contains("SSH_PORT=\"2222\""));
}

#[test]
fn test_empty_value_clears_field() {
    let env = TestEnv::new();
    env.write_config("VM_NAME=\"box\"\nZONE=\"us-east1-c\"\nPROJECT=\"acme\"\n");
    env.cmd().args(["config", "--project", ""]).assert().success();
    assert!(!env.read_config().contains("PROJECT"));
}

#[test]
fn test_invalid_name_rejected_and_not_saved() {
    let env = TestEnv::new();
    env.write_config("VM_NAME=\"box\"\nZONE=\"us-east1-c\"\n");
    env.cmd()
        .args(["config", "--vm-name", "vm_name"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    assert!(env.read_config().contains("VM_NAME=\"box\""));
}

#[test]
fn test_reads_legacy_shell_format() {
    let env = TestEnv::new();
    env.write_config(
        "# written by an older release\nexport VM_NAME=old-box\nZONE='us-west1-a'\nFOO=\"ignored\"\n",
    );
    env.cmd()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("old-box"))
        .stdout(predicate::str::contains("us-west1-a"));
}

#[test]
fn test_migrate_imports_legacy_config() {
    let env = TestEnv::new();
    let legacy = env.home.path().join(".vmws");
    fs::create_dir(&legacy).unwrap();
    fs::write(legacy.join("config"), "VM_NAME=\"legacy-box\"\nZONE=\"us-central1-f\"\n").unwrap();

    env.cmd()
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated"));
    assert!(env.config_dir().join(".migrated").exists());
    assert!(legacy.join("config").exists());

    env.cmd()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy-box"));

    env.cmd()
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already migrated"));
}
