//! # vmctl SSH Command
//!
//! File: cli/src/commands/vm/ssh.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `vmctl ssh` opens an interactive shell on the host. `vmctl ssh <command...>`
//! runs one command there with the terminal attached and fails if the command
//! does.
//!
//! The session goes through the same transport as every other remote
//! operation: IAP by default, plain SSH when `SSH_HOST` is configured.
//!
//! ## Usage
//!
//! ```bash
//! vmctl ssh
//! vmctl ssh df -h /srv
//! vmctl ssh -- sudo docker ps -a
//! ```
//!
use crate::commands::CommandContext;
use crate::common::process::{run_attached, AttachedExit, InterruptPolicy, SystemRunner};
use crate::common::transport::select_transport;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct SshArgs {
    /// Command to run instead of an interactive shell
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl SshArgs {
    fn remote_command(&self) -> Option<String> {
        (!self.command.is_empty()).then(|| self.command.join(" "))
    }
}

pub async fn handle_ssh(args: SshArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;

    let command = args.remote_command();
    let argv = transport.session_argv(command.as_deref(), false);
    match command {
        None => {
            println!("Connecting to {}...", transport.target());
            run_attached(&argv, InterruptPolicy::Inherit).await?;
            Ok(())
        }
        Some(command) => match run_attached(&argv, InterruptPolicy::Inherit).await? {
            AttachedExit::Completed { success: false } => Err(anyhow!(VmctlError::StepFailed {
                step: format!("Remote command '{}'", command),
                detail: "exited with a non-zero status".to_string(),
            })),
            _ => Ok(()),
        },
    }
}
