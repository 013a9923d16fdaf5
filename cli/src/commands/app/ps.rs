//! # vmctl Ps Command
//!
//! File: cli/src/commands/app/ps.rs
//! Author: Christi Mahu
//!
//! `docker compose ps` in the app's remote directory.
//!
use super::resolve_app_dir;
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::transport::select_transport;
use crate::core::error::Result;
use crate::core::templating::RemoteScript;
use crate::deploy::steps;
use clap::Parser;
use tera::Context;

#[derive(Parser, Debug)]
pub struct PsArgs {
    /// Remote compose directory (defaults to the configured APP_DIR)
    #[arg(long)]
    app_dir: Option<String>,

    /// Include stopped containers
    #[arg(short, long)]
    all: bool,
}

pub async fn handle_ps(args: PsArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let app_dir = resolve_app_dir(args.app_dir.as_deref(), &config)?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;

    let mut context = Context::new();
    context.insert("app_dir", &app_dir);
    context.insert("all", &args.all);
    let output = steps::run_script(
        transport.as_ref(),
        "Container status",
        RemoteScript::ComposePs,
        &context,
    )?;

    if output.stdout.trim().is_empty() {
        println!("No containers found");
    } else {
        println!("{}", output.stdout);
    }
    Ok(())
}
