//! # Data Disk Snapshots (`cloud::disk`)
//!
//! File: cli/src/cloud/disk.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The VM keeps user data on a separate persistent disk named `<vm>-disk`.
//! Backups are snapshots of that disk named `<vm>-backup-<YYYYmmdd-HHMMSS>`.
//!
//! ## Restore sequence
//!
//! 1. Stop the VM if it is running.
//! 2. Detach the data disk (tolerated if it is already detached).
//! 3. Delete the data disk.
//! 4. Create a new data disk from the snapshot.
//! 5. Attach it and start the VM.
//!
//! Any failure after step 2 stops the sequence; nothing is rolled back.
//!
use super::instance::{InstanceManager, STATUS_RUNNING};
use super::{args, GcloudCli};
use crate::common::process::CommandOutput;
use crate::core::error::{Result, VmctlError};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::{info, warn};

/// One entry of `gcloud compute snapshots list --format=json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub name: String,
    #[serde(default)]
    pub creation_timestamp: String,
    #[serde(default)]
    pub disk_size_gb: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub struct DiskManager<'a> {
    gcloud: GcloudCli<'a>,
}

impl<'a> DiskManager<'a> {
    pub fn new(gcloud: GcloudCli<'a>) -> Self {
        Self { gcloud }
    }

    pub fn data_disk_name(&self) -> String {
        format!("{}-disk", self.gcloud.config().vm_name)
    }

    fn snapshot_prefix(&self) -> String {
        format!("{}-backup-", self.gcloud.config().vm_name)
    }

    pub fn snapshot_name_at(&self, at: DateTime<Local>) -> String {
        format!("{}{}", self.snapshot_prefix(), at.format("%Y%m%d-%H%M%S"))
    }

    /// Snapshots the data disk and returns the snapshot name.
    pub fn snapshot(&self, description: Option<&str>) -> Result<String> {
        let snapshot_name = self.snapshot_name_at(Local::now());
        let mut argv = args(["compute", "disks", "snapshot"]);
        argv.push(self.data_disk_name());
        argv.push(format!("--snapshot-names={}", snapshot_name));
        argv.extend(self.gcloud.location_flags());
        if let Some(description) = description {
            argv.push(format!("--description={}", description));
        }

        info!("Creating snapshot {}", snapshot_name);
        let output = self.gcloud.run(argv);
        if !output.success {
            return Err(anyhow!(VmctlError::Cloud(format!(
                "Failed to create snapshot: {}",
                output.failure_detail()
            ))));
        }
        Ok(snapshot_name)
    }

    /// Backup snapshots of this VM, newest first.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>> {
        let mut argv = args(["compute", "snapshots", "list"]);
        argv.push(format!("--filter=name~^{}", self.snapshot_prefix()));
        argv.extend(self.gcloud.project_flags());
        argv.push("--format=json".to_string());

        let output = self.gcloud.run(argv);
        if !output.success {
            return Err(anyhow!(VmctlError::Cloud(format!(
                "Failed to list snapshots: {}",
                output.failure_detail()
            ))));
        }
        parse_snapshot_list(&output.stdout)
    }

    /// Replaces the data disk with one created from `snapshot`.
    ///
    /// `progress` receives a short description before each step.
    pub fn restore(&self, snapshot: &str, progress: &mut dyn FnMut(&str)) -> Result<()> {
        let instance = InstanceManager::new(GcloudCli::new(
            self.gcloud.runner(),
            self.gcloud.config(),
        ));
        let disk = self.data_disk_name();

        if instance.status()?.as_deref() == Some(STATUS_RUNNING) {
            progress("Stopping VM for restore...");
            instance.stop()?;
        }

        progress(&format!("Detaching data disk {}...", disk));
        let detach = self.instances_disk_op("detach-disk", &disk);
        if !detach.success {
            warn!(
                "Detach of {} failed (continuing, it may already be detached): {}",
                disk,
                detach.failure_detail()
            );
        }

        progress(&format!("Deleting data disk {}...", disk));
        let mut argv = args(["compute", "disks", "delete"]);
        argv.push(disk.clone());
        argv.extend(self.gcloud.location_flags());
        argv.push("--quiet".to_string());
        self.require(argv, "delete data disk")?;

        progress(&format!("Creating disk from snapshot {}...", snapshot));
        let mut argv = args(["compute", "disks", "create"]);
        argv.push(disk.clone());
        argv.push(format!("--source-snapshot={}", snapshot));
        argv.extend(self.gcloud.location_flags());
        self.require(argv, "create disk from snapshot")?;

        progress(&format!("Attaching data disk {}...", disk));
        let attach = self.instances_disk_op("attach-disk", &disk);
        if !attach.success {
            return Err(anyhow!(VmctlError::Cloud(format!(
                "Failed to attach restored disk: {}",
                attach.failure_detail()
            ))));
        }

        progress("Starting VM...");
        instance.start()
    }

    fn instances_disk_op(&self, verb: &str, disk: &str) -> CommandOutput {
        let mut argv = args(["compute", "instances", verb]);
        argv.push(self.gcloud.config().vm_name.clone());
        argv.push(format!("--disk={}", disk));
        argv.extend(self.gcloud.location_flags());
        self.gcloud.run(argv)
    }

    fn require(&self, argv: Vec<String>, what: &str) -> Result<()> {
        let output = self.gcloud.run(argv);
        if output.success {
            Ok(())
        } else {
            Err(anyhow!(VmctlError::Cloud(format!(
                "Failed to {}: {}",
                what,
                output.failure_detail()
            ))))
        }
    }
}

/// Parses gcloud's JSON snapshot listing, newest first.
pub fn parse_snapshot_list(json: &str) -> Result<Vec<SnapshotInfo>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut snapshots: Vec<SnapshotInfo> =
        serde_json::from_str(json).context("Unexpected snapshot listing from gcloud")?;
    snapshots.sort_by(|a, b| b.creation_timestamp.cmp(&a.creation_timestamp));
    Ok(snapshots)
}
