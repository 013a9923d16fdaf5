//! # vmctl CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every command is
//! pointed at a throwaway config directory and home directory so the tests
//! never read or write the real `~/.vmctl`.
//!
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn vmctl_cmd() -> Command {
    Command::cargo_bin("vmctl").expect("Failed to find vmctl binary for testing")
}

/// A fake home with an empty `.vmctl` config directory inside it.
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("Failed to create temp home"),
        }
    }

    pub fn config_dir(&self) -> std::path::PathBuf {
        self.home.path().join(".vmctl")
    }

    /// `vmctl` with HOME and VMCTL_CONFIG_DIR pointing into this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = vmctl_cmd();
        cmd.env("HOME", self.home.path())
            .env("VMCTL_CONFIG_DIR", self.config_dir())
            .env_remove("VMCTL_APPS_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Writes a config file directly, bypassing `vmctl config`.
    pub fn write_config(&self, content: &str) {
        fs::create_dir_all(self.config_dir()).expect("Failed to create config dir");
        fs::write(self.config_dir().join("config"), content).expect("Failed to write config");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_dir().join("config")).expect("Failed to read config")
    }
}

/// Creates `apps_dir/<name>/compose.yml` for each name.
pub fn make_apps(apps_dir: &Path, names: &[&str]) {
    for name in names {
        let app = apps_dir.join(name);
        fs::create_dir_all(&app).expect("Failed to create app dir");
        fs::write(app.join("compose.yml"), "services: {}\n").expect("Failed to write compose file");
    }
}
