//! # Direct SSH Transport
//!
//! File: cli/src/common/transport/direct.rs
//! Author: Christi Mahu
//!
//! Plain `ssh`/`scp` to `SSH_HOST`. Host keys are accepted on first contact
//! and never pinned (`StrictHostKeyChecking=no`, known hosts discarded). The
//! target need not be a cloud VM, so readiness is a round trip of `echo ok`
//! rather than an instance status lookup.
//!
use super::{Backend, RemoteTransport};
use crate::common::process::{CommandOutput, CommandRunner};
use crate::core::config::VmConfig;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use std::path::Path;
use tracing::debug;

pub struct DirectTransport<'a> {
    config: &'a VmConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> DirectTransport<'a> {
    pub fn new(config: &'a VmConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Options shared by ssh and scp; only the port flag differs (`-p` / `-P`).
    fn options(&self, port_flag: &str) -> Vec<String> {
        let mut opts = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
        ];
        if let Some(key) = &self.config.ssh_key {
            opts.push("-i".to_string());
            opts.push(shellexpand::tilde(key).into_owned());
        }
        if let Some(port) = self.config.ssh_port {
            opts.push(port_flag.to_string());
            opts.push(port.to_string());
        }
        opts
    }

    fn host(&self) -> &str {
        self.config.ssh_host.as_deref().unwrap_or_default()
    }

    fn destination(&self) -> String {
        match &self.config.ssh_user {
            Some(user) => format!("{}@{}", user, self.host()),
            None => self.host().to_string(),
        }
    }
}

impl RemoteTransport for DirectTransport<'_> {
    fn backend(&self) -> Backend {
        Backend::Direct
    }

    fn target(&self) -> String {
        match self.config.ssh_port {
            Some(port) => format!("{}:{}", self.destination(), port),
            None => self.destination(),
        }
    }

    fn exec(&self, command: &str) -> CommandOutput {
        let mut argv = self.options("-p");
        argv.push(self.destination());
        argv.push(command.to_string());
        self.runner.run("ssh", &argv)
    }

    fn copy(&self, local: &Path, remote_dir: &str, recursive: bool) -> CommandOutput {
        let mut argv = self.options("-P");
        if recursive {
            argv.push("-r".to_string());
        }
        argv.push(local.display().to_string());
        argv.push(format!("{}:{}", self.destination(), remote_dir));
        self.runner.run("scp", &argv)
    }

    fn ensure_ready(&self) -> Result<()> {
        let output = self.exec("echo ok");
        debug!("Connectivity check for {}: {:?}", self.target(), output);
        if output.success && output.stdout.lines().any(|l| l.trim() == "ok") {
            return Ok(());
        }
        Err(anyhow!(VmctlError::Unreachable {
            target: self.target(),
            detail: output.failure_detail(),
        }))
    }

    fn session_argv(&self, command: Option<&str>, tty: bool) -> Vec<String> {
        let mut argv = vec!["ssh".to_string()];
        argv.extend(self.options("-p"));
        if tty {
            argv.push("-t".to_string());
        }
        argv.push(self.destination());
        if let Some(command) = command {
            argv.push(command.to_string());
        }
        argv
    }
}
