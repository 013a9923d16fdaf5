//! # vmctl Deploy Command
//!
//! File: cli/src/commands/app/deploy.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Deploys the app already present in a remote directory. This runs the same
//! deploy script `vmctl setup` uses for each app:
//!
//! 1. `./deploy.sh` if present, else `git pull --ff-only` in a checkout.
//! 2. Fail unless a compose file exists.
//! 3. `docker compose up -d --build`, then `docker compose ps`.
//!
//! Nothing is copied from this machine; use `vmctl setup` for that.
//!
use super::{print_output, resolve_app_dir};
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::transport::select_transport;
use crate::core::error::Result;
use crate::deploy::steps;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Remote compose directory (defaults to the configured APP_DIR)
    #[arg(long)]
    app_dir: Option<String>,
}

pub async fn handle_deploy(args: DeployArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let app_dir = resolve_app_dir(args.app_dir.as_deref(), &config)?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;

    println!("Deploying {} on {}...", app_dir, transport.target());
    let output = steps::deploy_app(transport.as_ref(), &app_dir, &app_dir)?;
    print_output(&output.stdout);
    println!("\nApplication deployed.");
    Ok(())
}
