//! # vmctl Cloud Control Plane (`cloud`)
//!
//! File: cli/src/cloud/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! vmctl never talks to the Google Cloud APIs directly. Every control-plane
//! action is one `gcloud` invocation whose outcome is a `CommandOutput`. This
//! module holds the shared `GcloudCli` wrapper and the managers built on it:
//!
//! - **`instance`**: describe/start/stop/delete the VM.
//! - **`disk`**: snapshot, list and restore the VM's data disk.
//! - **`iam`**: grant project roles to the VM's service account.
//!
//! `--project` is only passed when a project is configured, so an unset
//! project falls back to gcloud's own active project.
//!
use crate::common::process::{CommandOutput, CommandRunner};
use crate::core::config::VmConfig;
use tracing::debug;

pub mod disk;
pub mod iam;
pub mod instance;

/// Builds and runs `gcloud` command lines for one configured VM.
pub struct GcloudCli<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a VmConfig,
}

impl<'a> GcloudCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a VmConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn config(&self) -> &'a VmConfig {
        self.config
    }

    /// `--project=<id>` if a project is configured.
    pub fn project_flags(&self) -> Vec<String> {
        self.config
            .project
            .iter()
            .map(|p| format!("--project={}", p))
            .collect()
    }

    /// `--zone=<zone>` followed by the project flag.
    pub fn location_flags(&self) -> Vec<String> {
        let mut flags = vec![format!("--zone={}", self.config.zone)];
        flags.extend(self.project_flags());
        flags
    }

    /// Runs `gcloud <args>`.
    pub fn run(&self, args: Vec<String>) -> CommandOutput {
        debug!("gcloud {}", args.first().map(String::as_str).unwrap_or(""));
        self.runner.run("gcloud", &args)
    }
}

/// Collects string-ish arguments into an owned argv.
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::mock::MockRunner;

    #[test]
    fn test_location_flags_omit_unset_project() {
        let runner = MockRunner::new();
        let config = VmConfig::default();
        let gcloud = GcloudCli::new(&runner, &config);
        assert_eq!(gcloud.location_flags(), vec!["--zone=us-central1-a"]);

        let with_project = VmConfig {
            project: Some("acme".into()),
            ..VmConfig::default()
        };
        let gcloud = GcloudCli::new(&runner, &with_project);
        assert_eq!(
            gcloud.location_flags(),
            vec!["--zone=us-central1-a", "--project=acme"]
        );
    }
}
