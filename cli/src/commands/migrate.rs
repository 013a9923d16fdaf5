//! # vmctl Migrate Command
//!
//! File: cli/src/commands/migrate.rs
//! Author: Christi Mahu
//!
//! Imports settings from an earlier version of this tool (`~/.codestation`,
//! else `~/.vmws`) into the vmctl config directory. The old directory is left
//! as it was. An existing vmctl configuration is only overwritten with
//! `--force`.
//!
use super::CommandContext;
use crate::core::error::{Result, VmctlError};
use crate::core::migration::MigrationOutcome;
use anyhow::anyhow;
use clap::Parser;
use tracing::warn;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Overwrite an existing vmctl configuration
    #[arg(long)]
    force: bool,
}

pub async fn handle_migrate(args: MigrateArgs, ctx: &CommandContext) -> Result<()> {
    let migration = ctx.migration().ok_or_else(|| {
        anyhow!(VmctlError::Config(
            "Could not determine the home directory".to_string()
        ))
    })?;
    let manager = ctx.manager();

    if manager.exists() && !args.force && migration.needs_migration() {
        println!(
            "A vmctl configuration already exists at {}.",
            manager.paths().config_file.display()
        );
        println!("Re-run with --force to replace it with the legacy settings.");
        return Ok(());
    }

    match migration.migrate()? {
        MigrationOutcome::Migrated { from, bytes } => {
            println!(
                "Migrated {} ({} bytes) to {}",
                from.display(),
                bytes,
                manager.paths().config_dir.display()
            );
            println!("The original directory was left in place.");
            if let Err(e) = manager.load() {
                warn!("Imported configuration does not load cleanly: {}", e);
                println!("Check it with: vmctl config --show");
            }
        }
        MigrationOutcome::AlreadyMigrated => {
            println!("Already migrated. Nothing to do.");
        }
        MigrationOutcome::NothingToMigrate => {
            println!("No legacy configuration found (~/.codestation or ~/.vmws).");
        }
    }
    Ok(())
}
