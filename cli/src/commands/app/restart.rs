//! # vmctl Restart Command
//!
//! File: cli/src/commands/app/restart.rs
//! Author: Christi Mahu
//!
//! `docker compose restart [service]` in the app's remote directory, followed
//! by the resulting container status.
//!
use super::{print_output, resolve_app_dir};
use crate::commands::CommandContext;
use crate::common::process::SystemRunner;
use crate::common::transport::select_transport;
use crate::core::error::Result;
use crate::core::templating::RemoteScript;
use crate::deploy::steps;
use clap::Parser;
use tera::Context;

#[derive(Parser, Debug)]
pub struct RestartArgs {
    /// Remote compose directory (defaults to the configured APP_DIR)
    #[arg(long)]
    app_dir: Option<String>,

    /// Restart only this service
    service: Option<String>,
}

pub async fn handle_restart(args: RestartArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let app_dir = resolve_app_dir(args.app_dir.as_deref(), &config)?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;

    let target = args
        .service
        .as_deref()
        .map(|s| format!("service '{}'", s))
        .unwrap_or_else(|| "all services".to_string());
    println!("Restarting {} in {}...", target, app_dir);

    let mut context = Context::new();
    context.insert("app_dir", &app_dir);
    context.insert("service", &args.service);
    let output = steps::run_script(
        transport.as_ref(),
        "Restart",
        RemoteScript::ComposeRestart,
        &context,
    )?;
    print_output(&output.stdout);
    println!("Restarted {}.", target);
    Ok(())
}
