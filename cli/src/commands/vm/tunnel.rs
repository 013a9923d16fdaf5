//! # vmctl Tunnel Command
//!
//! File: cli/src/commands/vm/tunnel.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Forwards a local port to code-server on the workstation through IAP:
//!
//! ```text
//! gcloud compute start-iap-tunnel <vm> <remote-port> --local-host-port=localhost:<local-port> --zone=... [--project=...]
//! ```
//!
//! The tunnel runs in the foreground until Ctrl+C, which closes it and exits
//! cleanly. A direct SSH host has no cloud instance to tunnel to, so the
//! command refuses to run when `SSH_HOST` is set. The VM must be `RUNNING`
//! and the local port must be free.
//!
use crate::cloud::instance::InstanceManager;
use crate::cloud::{args, GcloudCli};
use crate::commands::CommandContext;
use crate::common::process::{run_attached, AttachedExit, InterruptPolicy, SystemRunner};
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use clap::Parser;
use std::net::TcpListener;

pub const DEFAULT_CODE_SERVER_PORT: u16 = 8080;

#[derive(Parser, Debug)]
pub struct TunnelArgs {
    /// Local port to listen on
    #[arg(long, default_value_t = DEFAULT_CODE_SERVER_PORT)]
    local_port: u16,

    /// Port code-server listens on inside the VM
    #[arg(long, default_value_t = DEFAULT_CODE_SERVER_PORT)]
    remote_port: u16,
}

fn tunnel_argv(gcloud: &GcloudCli<'_>, local: u16, remote: u16) -> Vec<String> {
    let mut argv = args(["gcloud", "compute", "start-iap-tunnel"]);
    argv.push(gcloud.config().vm_name.clone());
    argv.push(remote.to_string());
    argv.push(format!("--local-host-port=localhost:{}", local));
    argv.extend(gcloud.location_flags());
    argv
}

fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

pub async fn handle_tunnel(args: TunnelArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    if config.uses_direct_ssh() {
        return Err(anyhow!(VmctlError::Config(
            "tunnel needs the IAP transport, but SSH_HOST is set. Use 'ssh -L' to the host instead."
                .to_string()
        )));
    }
    if args.local_port == 0 || args.remote_port == 0 {
        return Err(anyhow!(VmctlError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        }));
    }

    let runner = SystemRunner;
    let gcloud = GcloudCli::new(&runner, &config);
    InstanceManager::new(GcloudCli::new(&runner, &config)).ensure_running()?;

    if !port_is_free(args.local_port) {
        return Err(anyhow!(VmctlError::Validation {
            field: "--local-port".into(),
            reason: format!(
                "localhost:{} is already in use (is a tunnel already running?)",
                args.local_port
            ),
        }));
    }

    println!(
        "Starting IAP tunnel to {}:{} -> localhost:{}...",
        config.vm_name, args.remote_port, args.local_port
    );
    println!("Access code-server at http://localhost:{}", args.local_port);
    println!("Press Ctrl+C to stop the tunnel");

    let argv = tunnel_argv(&gcloud, args.local_port, args.remote_port);
    match run_attached(&argv, InterruptPolicy::StopChild).await? {
        AttachedExit::Interrupted => {
            println!("\nTunnel stopped");
            Ok(())
        }
        AttachedExit::Completed { success: true } => Ok(()),
        AttachedExit::Completed { success: false } => Err(anyhow!(VmctlError::Cloud(
            "Failed to start tunnel (see gcloud output above)".to_string()
        ))),
    }
}
