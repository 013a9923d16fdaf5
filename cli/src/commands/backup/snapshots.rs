//! # vmctl Snapshots Command
//!
//! File: cli/src/commands/backup/snapshots.rs
//! Author: Christi Mahu
//!
//! Lists this VM's backup snapshots, newest first.
//!
use crate::cloud::disk::{DiskManager, SnapshotInfo};
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::core::error::Result;
use chrono::DateTime;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct SnapshotsArgs {}

pub async fn handle_snapshots(_args: SnapshotsArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let snapshots = DiskManager::new(GcloudCli::new(&runner, &config)).list_snapshots()?;

    if snapshots.is_empty() {
        println!("No snapshots found for VM '{}'.", config.vm_name);
        println!("\nCreate a backup: vmctl backup");
        return Ok(());
    }

    println!("{}", format_snapshot_table(&snapshots));
    println!("\nTotal snapshots: {}", snapshots.len());
    println!("Restore from snapshot: vmctl restore <snapshot-name>");
    Ok(())
}

/// `2024-03-09T14:05:07.123-08:00` -> `2024-03-09 14:05`. Unparseable input is shown as-is.
fn format_created(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn format_snapshot_table(snapshots: &[SnapshotInfo]) -> String {
    let name_width = snapshots
        .iter()
        .map(|s| s.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(0);
    let mut lines = vec![format!(
        "{:<name_width$}  {:<16}  {:>7}  {}",
        "NAME",
        "CREATED",
        "SIZE",
        "STATUS",
        name_width = name_width
    )];
    for snapshot in snapshots {
        let size = snapshot
            .disk_size_gb
            .as_deref()
            .map(|gb| format!("{} GB", gb))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<name_width$}  {:<16}  {:>7}  {}",
            snapshot.name,
            format_created(&snapshot.creation_timestamp),
            size,
            snapshot.status.as_deref().unwrap_or("-"),
            name_width = name_width
        ));
    }
    lines.join("\n")
}
