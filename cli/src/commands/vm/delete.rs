//! # vmctl Delete Command
//!
//! File: cli/src/commands/vm/delete.rs
//! Author: Christi Mahu
//!
//! Deletes the VM and its boot disk after a confirmation (`--yes` skips it).
//! The data disk and its snapshots are kept.
//!
use crate::cloud::instance::InstanceManager;
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::ui;
use crate::core::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn handle_delete(args: DeleteArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let instance = InstanceManager::new(GcloudCli::new(&runner, &config));
    instance.require_status()?;

    if !args.yes {
        println!(
            "This deletes VM '{}' and its boot disk. The data disk and snapshots are kept.",
            instance.name()
        );
    }
    if !ui::confirm(&format!("Delete VM '{}'?", instance.name()), args.yes)? {
        println!("Cancelled");
        return Ok(());
    }

    println!("Deleting VM '{}'...", instance.name());
    instance.delete()?;
    println!("VM '{}' deleted.", instance.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_args() {
        assert!(!DeleteArgs::try_parse_from(["delete"]).unwrap().yes);
        assert!(DeleteArgs::try_parse_from(["delete", "--yes"]).unwrap().yes);
        assert!(DeleteArgs::try_parse_from(["delete", "-y"]).unwrap().yes);
    }
}
