//! # vmctl Config Command
//!
//! File: cli/src/commands/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `vmctl config` views and edits the saved settings in `~/.vmctl/config`.
//!
//! - Any setting flag merges that value into the saved configuration. Fields
//!   that are not named keep their current value. An empty value
//!   (`--project ""`) clears an optional field.
//! - `--show` prints every setting, with `(not set)` for unset ones.
//! - No flags prints a short usage hint.
//!
//! The first save creates the file from defaults (`dev-workstation`,
//! `us-central1-a`, and the active gcloud project if there is one).
//!
//! ## Usage
//!
//! ```bash
//! vmctl config --vm-name my-dev-vm --zone us-central1-a
//! vmctl config --ssh-host 203.0.113.7 --ssh-user dev --ssh-key ~/.ssh/id_ed25519
//! vmctl config --ssh-host ""        # back to the IAP transport
//! vmctl config --show
//! ```
//!
use super::CommandContext;
use crate::common::ui;
use crate::core::config::ConfigUpdate;
use crate::core::error::Result;
use clap::Parser;
use tracing::debug;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// VM instance name
    #[arg(long)]
    vm_name: Option<String>,

    /// Compute zone (e.g. us-central1-a)
    #[arg(long)]
    zone: Option<String>,

    /// Cloud project ID
    #[arg(long)]
    project: Option<String>,

    /// Source workstation disk, for migrating from a managed workstation
    #[arg(long)]
    workstation_disk: Option<String>,

    /// Compute region
    #[arg(long)]
    region: Option<String>,

    /// Default remote compose directory for deploy, ps, logs and restart
    #[arg(long)]
    app_dir: Option<String>,

    /// Host for direct SSH. When set, IAP is not used
    #[arg(long)]
    ssh_host: Option<String>,

    /// User for direct SSH
    #[arg(long)]
    ssh_user: Option<String>,

    /// Private key for direct SSH
    #[arg(long)]
    ssh_key: Option<String>,

    /// Port for direct SSH
    #[arg(long)]
    ssh_port: Option<u16>,

    /// Show the current configuration
    #[arg(long)]
    show: bool,
}

impl ConfigArgs {
    fn update(&self) -> ConfigUpdate {
        ConfigUpdate {
            vm_name: self.vm_name.clone(),
            zone: self.zone.clone(),
            project: self.project.clone(),
            workstation_disk: self.workstation_disk.clone(),
            region: self.region.clone(),
            app_dir: self.app_dir.clone(),
            ssh_host: self.ssh_host.clone(),
            ssh_user: self.ssh_user.clone(),
            ssh_key: self.ssh_key.clone(),
            ssh_port: self.ssh_port,
        }
    }
}

pub async fn handle_config(args: ConfigArgs, ctx: &CommandContext) -> Result<()> {
    let manager = ctx.manager();
    let update = args.update();
    debug!("Config update: {:?}", update);

    if !update.is_empty() {
        let config = manager.update(update).await?;
        println!("Configuration updated");
        println!("{}", ui::format_rows(&config.display_rows()));
        println!("\nSaved to: {}", manager.paths().config_file.display());
        return Ok(());
    }

    if args.show {
        if !manager.exists() {
            println!("No configuration found.");
            println!("\nCreate one with: vmctl config --vm-name <name> --zone <zone>");
            return Ok(());
        }
        let config = manager.load()?;
        println!("vmctl configuration");
        println!("{}", ui::format_rows(&config.display_rows()));
        println!("\nConfig file: {}", manager.paths().config_file.display());
        return Ok(());
    }

    println!("No options specified. Use --help for usage.");
    println!("\nQuick start:");
    println!("  vmctl config --vm-name my-dev-vm --zone us-central1-a");
    println!("\nShow current config:");
    println!("  vmctl config --show");
    Ok(())
}
