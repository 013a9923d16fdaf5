//! # vmctl Logs Command
//!
//! File: cli/src/commands/app/logs.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `docker compose logs` in the app's remote directory.
//!
//! Without `--follow` the logs are captured and printed. With `--follow` the
//! remote command runs attached to the terminal until Ctrl+C, which stops the
//! stream and exits cleanly.
//!
use super::resolve_app_dir;
use crate::commands::CommandContext;
use crate::common::process::{run_attached, AttachedExit, InterruptPolicy, SystemRunner};
use crate::common::transport::select_transport;
use crate::core::error::{Result, VmctlError};
use crate::core::templating::{render_script, RemoteScript};
use crate::deploy::steps;
use anyhow::anyhow;
use clap::Parser;
use tera::Context;

#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Remote compose directory (defaults to the configured APP_DIR)
    #[arg(long)]
    app_dir: Option<String>,

    /// Stream new log lines until Ctrl+C
    #[arg(short, long)]
    follow: bool,

    /// Number of lines to show from the end of the logs
    #[arg(short = 'n', long, default_value_t = 100)]
    tail: u32,

    /// Show logs for this service only
    service: Option<String>,
}

impl LogsArgs {
    fn context(&self, app_dir: &str) -> Context {
        let mut context = Context::new();
        context.insert("app_dir", app_dir);
        context.insert("follow", &self.follow);
        context.insert("tail", &self.tail);
        context.insert("service", &self.service);
        context
    }
}

pub async fn handle_logs(args: LogsArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let app_dir = resolve_app_dir(args.app_dir.as_deref(), &config)?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;
    let context = args.context(&app_dir);

    if !args.follow {
        let output =
            steps::run_script(transport.as_ref(), "Fetching logs", RemoteScript::ComposeLogs, &context)?;
        if output.stdout.trim().is_empty() {
            println!("No logs found");
        } else {
            println!("{}", output.stdout);
        }
        return Ok(());
    }

    println!("Following logs in {} (Ctrl+C to stop)...", app_dir);
    let script = render_script(RemoteScript::ComposeLogs, &context)?;
    let argv = transport.session_argv(Some(&script), false);
    match run_attached(&argv, InterruptPolicy::StopChild).await? {
        AttachedExit::Interrupted => {
            println!("\nLog streaming stopped");
            Ok(())
        }
        AttachedExit::Completed { success: true } => Ok(()),
        AttachedExit::Completed { success: false } => Err(anyhow!(VmctlError::StepFailed {
            step: "Log streaming".to_string(),
            detail: "remote command exited with a non-zero status".to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_defaults() {
        let args = LogsArgs::try_parse_from(["logs"]).unwrap();
        assert!(!args.follow);
        assert_eq!(args.tail, 100);
        assert!(args.service.is_none());
    }

    #[test]
    fn test_logs_script_from_args() {
        let args = LogsArgs::try_parse_from(["logs", "-f", "--tail", "20", "gateway"]).unwrap();
        let script = render_script(RemoteScript::ComposeLogs, &args.context("/srv/vmctl/apps/x")).unwrap();
        assert!(script.contains("cd /srv/vmctl/apps/x"));
        assert!(script.contains("docker compose logs -f --tail 20 gateway"));
    }
}
