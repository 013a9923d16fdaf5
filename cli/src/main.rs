//! # vmctl Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `vmctl` manages a self-hosted development VM on Google Cloud and the apps
//! running on it. This file:
//! - parses the command line with Clap,
//! - sets up logging from the verbosity flags,
//! - dispatches to the command handler,
//! - turns any error into `Error: <message>` on stderr and exit status 1.
//!
//! ## Architecture
//!
//! - `commands`: one module per subcommand (`XArgs` + `handle_x`).
//! - `cloud`: the compute control plane through `gcloud` (instances, disks, IAM).
//! - `deploy`: app bundles, remote setup steps and the setup orchestrator.
//! - `common`: processes, remote transports, filesystem and terminal helpers.
//! - `core`: configuration, errors, remote script templates, legacy migration.
//!
//! ## Examples
//!
//! ```bash
//! vmctl config --vm-name my-dev-vm --zone us-central1-a
//! vmctl start
//! vmctl setup --apps openclaw-gateway,workstation
//! vmctl -vv logs --app-dir /srv/vmctl/apps/workstation --follow
//! vmctl stop
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod cloud; // gcloud-backed instance, disk and IAM operations
mod commands; // Subcommand handlers
mod common; // Shared utilities (process, transport, fs, ui)
mod core; // Config, errors, templating, migration
mod deploy; // App bundles and the setup pipeline

use commands::CommandContext;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "vmctl",
    about = "Self-managed development VMs on Google Cloud",
    long_about = "Start, stop, back up and connect to a development VM, and deploy\n\
                  Docker Compose apps onto it over IAP or plain SSH.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the vmctl config file [default: ~/.vmctl]
    #[arg(long, env = "VMCTL_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// View or change saved settings
    Config(commands::config::ConfigArgs),
    /// Start the VM
    Start(commands::vm::start::StartArgs),
    /// Stop the VM
    Stop(commands::vm::stop::StopArgs),
    /// Show VM status
    Status(commands::vm::status::StatusArgs),
    /// Delete the VM and its boot disk
    Delete(commands::vm::delete::DeleteArgs),
    /// Open a shell or run a command on the host
    Ssh(commands::vm::ssh::SshArgs),
    /// Forward a local port to code-server through IAP
    Tunnel(commands::vm::tunnel::TunnelArgs),
    /// Snapshot the data disk
    Backup(commands::backup::create::BackupArgs),
    /// Replace the data disk from a snapshot
    Restore(commands::backup::restore::RestoreArgs),
    /// List backup snapshots
    Snapshots(commands::backup::snapshots::SnapshotsArgs),
    /// Install Docker on the host
    Provision(commands::app::provision::ProvisionArgs),
    /// Deploy an app already on the host
    Deploy(commands::app::deploy::DeployArgs),
    /// Show an app's containers
    Ps(commands::app::ps::PsArgs),
    /// Show an app's logs
    Logs(commands::app::logs::LogsArgs),
    /// Restart an app's services
    Restart(commands::app::restart::RestartArgs),
    /// Provision the host and deploy every app
    Setup(commands::setup::SetupArgs),
    /// Manage the gateway secrets file
    Secrets(commands::secrets::SecretsArgs),
    /// Import settings from an earlier version of this tool
    Migrate(commands::migrate::MigrateArgs),
}

async fn dispatch(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Config(args) => commands::config::handle_config(args, ctx).await,
        Commands::Start(args) => commands::vm::start::handle_start(args, ctx).await,
        Commands::Stop(args) => commands::vm::stop::handle_stop(args, ctx).await,
        Commands::Status(args) => commands::vm::status::handle_status(args, ctx).await,
        Commands::Delete(args) => commands::vm::delete::handle_delete(args, ctx).await,
        Commands::Ssh(args) => commands::vm::ssh::handle_ssh(args, ctx).await,
        Commands::Tunnel(args) => commands::vm::tunnel::handle_tunnel(args, ctx).await,
        Commands::Backup(args) => commands::backup::create::handle_backup(args, ctx).await,
        Commands::Restore(args) => commands::backup::restore::handle_restore(args, ctx).await,
        Commands::Snapshots(args) => {
            commands::backup::snapshots::handle_snapshots(args, ctx).await
        }
        Commands::Provision(args) => commands::app::provision::handle_provision(args, ctx).await,
        Commands::Deploy(args) => commands::app::deploy::handle_deploy(args, ctx).await,
        Commands::Ps(args) => commands::app::ps::handle_ps(args, ctx).await,
        Commands::Logs(args) => commands::app::logs::handle_logs(args, ctx).await,
        Commands::Restart(args) => commands::app::restart::handle_restart(args, ctx).await,
        Commands::Setup(args) => commands::setup::handle_setup(args, ctx).await,
        Commands::Secrets(args) => commands::secrets::handle_secrets(args, ctx).await,
        Commands::Migrate(args) => commands::migrate::handle_migrate(args, ctx).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match CommandContext::new(cli.config_dir.as_deref()) {
        Ok(ctx) => dispatch(cli.command, &ctx).await,
        Err(e) => Err(e),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
