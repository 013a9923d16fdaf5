//! # vmctl Restore Command
//!
//! File: cli/src/commands/backup/restore.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Replaces the VM's data disk with a new disk built from a backup snapshot.
//! Everything currently on the data disk is lost, so the command asks first
//! unless `--yes` is given.
//!
//! Steps: stop the VM if it is running, detach and delete the data disk,
//! create it again from the snapshot, attach it and start the VM.
//!
use crate::cloud::disk::DiskManager;
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::ui;
use crate::core::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Snapshot to restore (see `vmctl snapshots`)
    snapshot: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn handle_restore(args: RestoreArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let disks = DiskManager::new(GcloudCli::new(&runner, &config));

    if !args.yes {
        println!(
            "This replaces {} on VM '{}' with snapshot {}.",
            disks.data_disk_name(),
            config.vm_name,
            args.snapshot
        );
        println!("All current data on the disk will be lost!");
        println!("Make sure you have a recent backup if needed.\n");
    }
    if !ui::confirm("Restore from this snapshot?", args.yes)? {
        println!("Cancelled");
        return Ok(());
    }

    disks.restore(&args.snapshot, &mut |step: &str| println!("{}", step))?;

    println!("\nRestore completed.");
    println!("VM '{}' is running with data from {}.", config.vm_name, args.snapshot);
    Ok(())
}
