//! # vmctl Provision Command
//!
//! File: cli/src/commands/app/provision.rs
//! Author: Christi Mahu
//!
//! Installs Docker and the compose plugin on the host if they are missing,
//! enables the service and prepares `/srv/vmctl`. Safe to run again.
//!
use super::print_output;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::transport::select_transport;
use crate::core::error::Result;
use crate::deploy::apps::REMOTE_BASE;
use crate::deploy::steps;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ProvisionArgs {}

pub async fn handle_provision(_args: ProvisionArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;

    println!("Provisioning Docker on {}...", transport.target());
    let output = steps::provision(transport.as_ref(), REMOTE_BASE)?;
    print_output(&output.stdout);

    println!("\nDocker provisioned.");
    println!("Log out and back in for docker group membership to apply; until then vmctl uses sudo.");
    Ok(())
}
