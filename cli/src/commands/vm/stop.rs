//! # vmctl Stop Command
//!
//! File: cli/src/commands/vm/stop.rs
//! Author: Christi Mahu
//!
//! Stops the configured VM so it stops accruing compute charges. The data
//! disk is kept. A VM that is already `TERMINATED` is left alone.
//!
use crate::cloud::instance::{InstanceManager, STATUS_TERMINATED};
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::core::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct StopArgs {}

pub async fn handle_stop(_args: StopArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let instance = InstanceManager::new(GcloudCli::new(&runner, &config));

    if instance.require_status()? == STATUS_TERMINATED {
        println!("VM '{}' is already stopped.", instance.name());
        return Ok(());
    }

    println!("Stopping VM '{}'...", instance.name());
    instance.stop()?;
    println!("VM '{}' stopped.", instance.name());
    Ok(())
}
