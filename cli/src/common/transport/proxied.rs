//! # Identity-Aware Proxy Transport
//!
//! File: cli/src/common/transport/proxied.rs
//! Author: Christi Mahu
//!
//! Reaches the VM through `gcloud compute ssh` / `gcloud compute scp` with
//! `--tunnel-through-iap`, so the VM needs no public address. Readiness is
//! the instance status reported by the control plane.
//!
use super::{Backend, RemoteTransport};
use crate::cloud::instance::InstanceManager;
use crate::cloud::{args, GcloudCli};
use crate::common::process::{CommandOutput, CommandRunner};
use crate::core::config::VmConfig;
use crate::core::error::Result;
use std::path::Path;

pub struct ProxiedTransport<'a> {
    config: &'a VmConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> ProxiedTransport<'a> {
    pub fn new(config: &'a VmConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    fn gcloud(&self) -> GcloudCli<'a> {
        GcloudCli::new(self.runner, self.config)
    }

    fn ssh_args(&self, command: Option<&str>) -> Vec<String> {
        let mut argv = args(["compute", "ssh"]);
        argv.push(self.config.vm_name.clone());
        argv.extend(self.gcloud().location_flags());
        argv.push("--tunnel-through-iap".to_string());
        if let Some(command) = command {
            argv.push("--command".to_string());
            argv.push(command.to_string());
        }
        argv
    }
}

impl RemoteTransport for ProxiedTransport<'_> {
    fn backend(&self) -> Backend {
        Backend::Proxied
    }

    fn target(&self) -> String {
        format!("{} ({}, via IAP)", self.config.vm_name, self.config.zone)
    }

    fn exec(&self, command: &str) -> CommandOutput {
        self.gcloud().run(self.ssh_args(Some(command)))
    }

    fn copy(&self, local: &Path, remote_dir: &str, recursive: bool) -> CommandOutput {
        let mut argv = args(["compute", "scp"]);
        if recursive {
            argv.push("--recurse".to_string());
        }
        argv.push(local.display().to_string());
        argv.push(format!("{}:{}", self.config.vm_name, remote_dir));
        argv.extend(self.gcloud().location_flags());
        argv.push("--tunnel-through-iap".to_string());
        self.gcloud().run(argv)
    }

    fn ensure_ready(&self) -> Result<()> {
        InstanceManager::new(self.gcloud()).ensure_running()
    }

    fn session_argv(&self, command: Option<&str>, tty: bool) -> Vec<String> {
        let mut argv = vec!["gcloud".to_string()];
        argv.extend(self.ssh_args(command));
        if tty && command.is_some() {
            argv.push("--ssh-flag=-t".to_string());
        }
        argv
    }
}
