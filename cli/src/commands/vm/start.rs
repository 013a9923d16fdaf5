//! # vmctl Start Command
//!
//! File: cli/src/commands/vm/start.rs
//! Author: Christi Mahu
//!
//! Starts the configured VM. A VM that is already `RUNNING` is left alone.
//!
use crate::cloud::instance::{InstanceManager, STATUS_RUNNING};
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::core::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct StartArgs {}

pub async fn handle_start(_args: StartArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let instance = InstanceManager::new(GcloudCli::new(&runner, &config));

    if instance.require_status()? == STATUS_RUNNING {
        println!("VM '{}' is already running.", instance.name());
        return Ok(());
    }

    println!("Starting VM '{}'...", instance.name());
    instance.start()?;
    println!("VM '{}' started.", instance.name());
    println!("\nConnect with: vmctl ssh");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_takes_no_arguments() {
        assert!(StartArgs::try_parse_from(["start"]).is_ok());
        assert!(StartArgs::try_parse_from(["start", "extra"]).is_err());
    }
}
