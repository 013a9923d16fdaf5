//! # VM Instance Lifecycle (`cloud::instance`)
//!
//! File: cli/src/cloud/instance.rs
//! Author: Christi Mahu
//!
//! Thin wrappers over `gcloud compute instances ...` for the configured VM.
//! Each call is a single blocking invocation; failures surface as
//! `VmctlError::Cloud` carrying gcloud's stderr.
//!
use super::{args, GcloudCli};
use crate::common::process::CommandOutput;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use tracing::{debug, info};

pub const STATUS_RUNNING: &str = "RUNNING";
pub const STATUS_TERMINATED: &str = "TERMINATED";

pub struct InstanceManager<'a> {
    gcloud: GcloudCli<'a>,
}

impl<'a> InstanceManager<'a> {
    pub fn new(gcloud: GcloudCli<'a>) -> Self {
        Self { gcloud }
    }

    pub fn name(&self) -> &'a str {
        &self.gcloud.config().vm_name
    }

    fn instances(&self, verb: &str, extra: &[&str]) -> CommandOutput {
        let mut argv = args(["compute", "instances", verb, self.name()]);
        argv.extend(self.gcloud.location_flags());
        argv.extend(args(extra.iter().copied()));
        self.gcloud.run(argv)
    }

    /// Current status (`RUNNING`, `TERMINATED`, ...), or `None` if the VM does not exist.
    pub fn status(&self) -> Result<Option<String>> {
        let output = self.instances("describe", &["--format=value(status)"]);
        if output.success {
            let status = output.stdout.trim().to_string();
            debug!("VM '{}' status: {}", self.name(), status);
            return Ok(Some(status));
        }
        if is_not_found(&output) {
            return Ok(None);
        }
        Err(anyhow!(VmctlError::Cloud(format!(
            "Could not describe VM '{}': {}",
            self.name(),
            output.failure_detail()
        ))))
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.status()?.is_some())
    }

    /// Status of an instance that must exist.
    pub fn require_status(&self) -> Result<String> {
        self.status()?.ok_or_else(|| {
            anyhow!(VmctlError::InstanceNotFound {
                name: self.name().to_string()
            })
        })
    }

    /// Fails unless the VM exists and is `RUNNING`.
    pub fn ensure_running(&self) -> Result<()> {
        let status = self.require_status()?;
        if status != STATUS_RUNNING {
            return Err(anyhow!(VmctlError::InstanceNotRunning {
                name: self.name().to_string(),
                status,
            }));
        }
        Ok(())
    }

    pub fn start(&self) -> Result<()> {
        info!("Starting VM '{}'", self.name());
        self.checked("start", &[])
    }

    pub fn stop(&self) -> Result<()> {
        info!("Stopping VM '{}'", self.name());
        self.checked("stop", &[])
    }

    /// Deletes the VM together with its boot disk. Other disks are kept.
    pub fn delete(&self) -> Result<()> {
        info!("Deleting VM '{}'", self.name());
        self.checked("delete", &["--delete-disks=boot", "--quiet"])
    }

    /// Email of the VM's first service account.
    pub fn service_account(&self) -> Result<Option<String>> {
        let output = self.instances("describe", &["--format=value(serviceAccounts[0].email)"]);
        if !output.success {
            return Err(anyhow!(VmctlError::Cloud(output.failure_detail())));
        }
        let email = output.stdout.trim();
        Ok((!email.is_empty()).then(|| email.to_string()))
    }

    fn checked(&self, verb: &str, extra: &[&str]) -> Result<()> {
        let output = self.instances(verb, extra);
        if output.success {
            Ok(())
        } else {
            Err(anyhow!(VmctlError::Cloud(format!(
                "Failed to {} VM '{}': {}",
                verb,
                self.name(),
                output.failure_detail()
            ))))
        }
    }
}

fn is_not_found(output: &CommandOutput) -> bool {
    let stderr = output.stderr.to_ascii_lowercase();
    stderr.contains("was not found") || stderr.contains("notfound")
}
