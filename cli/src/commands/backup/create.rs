//! # vmctl Backup Command
//!
//! File: cli/src/commands/backup/create.rs
//! Author: Christi Mahu
//!
use crate::cloud::disk::DiskManager;
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::core::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct BackupArgs {
    /// Description stored with the snapshot
    #[arg(short, long)]
    description: Option<String>,
}

pub async fn handle_backup(args: BackupArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let disks = DiskManager::new(GcloudCli::new(&runner, &config));

    println!("Creating snapshot of {}...", disks.data_disk_name());
    let snapshot = disks.snapshot(args.description.as_deref())?;

    println!("\nSnapshot created: {}", snapshot);
    println!("\nView all snapshots: vmctl snapshots");
    println!("Restore from snapshot: vmctl restore {}", snapshot);
    Ok(())
}
