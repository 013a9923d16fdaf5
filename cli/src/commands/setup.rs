//! # vmctl Setup Command
//!
//! File: cli/src/commands/setup.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `vmctl setup` takes a host from bare to running every requested app:
//! provision Docker, create the `/srv/vmctl` layout, then sync and deploy
//! each app bundle in order. The gateway app additionally gets its source
//! checkout synced (`--gateway-repo`), a secrets file check and IAM role
//! grants for the VM's service account.
//!
//! All local checks (apps directory, every named bundle, the gateway repo)
//! happen before the first remote call, so a typo never leaves a half
//! provisioned host. The first remote failure stops the run; apps already
//! deployed stay up.
//!
//! ## Usage
//!
//! ```bash
//! vmctl setup
//! vmctl setup --apps openclaw-gateway --gateway-repo ~/src/openclaw
//! vmctl setup --apps workstation --skip-provision
//! vmctl setup --apps-dir ./my-apps --apps web,worker
//! ```
//!
use super::CommandContext;
use crate::cloud::iam::{IamOutcome, InstanceIam, RoleGranter};
use crate::cloud::GcloudCli;
use crate::common::process::SystemRunner;
use crate::common::transport::{select_transport, Backend};
use crate::common::ui;
use crate::core::error::Result;
use crate::deploy::orchestrator::{SetupOrchestrator, SetupPlan, SetupReport, SetupRequest};
use crate::deploy::steps::SecretsStatus;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Comma-separated apps to deploy, in order [default: openclaw-gateway,workstation]
    #[arg(long)]
    apps: Option<String>,

    /// Local directory containing the app bundles
    #[arg(long, env = "VMCTL_APPS_DIR")]
    apps_dir: Option<PathBuf>,

    /// Skip Docker installation (host already provisioned)
    #[arg(long)]
    skip_provision: bool,

    /// Local source checkout synced to the gateway's build context
    #[arg(long)]
    gateway_repo: Option<PathBuf>,
}

impl SetupArgs {
    fn request(&self) -> SetupRequest {
        SetupRequest {
            apps: self.apps.clone(),
            apps_dir: self.apps_dir.clone(),
            skip_provision: self.skip_provision,
            gateway_repo: self.gateway_repo.clone(),
        }
    }
}

pub async fn handle_setup(args: SetupArgs, ctx: &CommandContext) -> Result<()> {
    let exe = std::env::current_exe().ok();
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let plan = SetupPlan::prepare(&args.request(), exe.as_deref(), &cwd)?;
    debug!("Setup plan: {:?}", plan);

    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);

    println!("Apps directory: {}", plan.apps_dir.display());
    println!("Apps: {}", plan.app_names().join(", "));
    println!("Target: {}", transport.target());
    transport.ensure_ready()?;

    let iam = InstanceIam::new(GcloudCli::new(&runner, &config));
    let granter: Option<&dyn RoleGranter> = match transport.backend() {
        Backend::Proxied => Some(&iam),
        Backend::Direct => None,
    };

    let report = SetupOrchestrator::new(transport.as_ref(), granter).execute(&plan)?;
    println!("\nSetup complete");
    println!("{}", ui::format_rows(&summary_rows(&report)));
    Ok(())
}

fn summary_rows(report: &SetupReport) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        (
            "Provisioned",
            if report.provisioned { "yes" } else { "skipped" }.to_string(),
        ),
        ("Deployed", report.deployed.join(", ")),
    ];
    if let Some(secrets) = &report.secrets {
        let text = match secrets {
            SecretsStatus::Present => "ok".to_string(),
            SecretsStatus::Empty => "empty (vmctl secrets --set KEY=VALUE)".to_string(),
            SecretsStatus::Missing => "missing (vmctl secrets --set KEY=VALUE)".to_string(),
            SecretsStatus::Unknown(detail) => format!("unknown ({})", detail),
        };
        rows.push(("Secrets", text));
    }
    if let Some(iam) = &report.iam {
        let text = match iam {
            IamOutcome::Granted { roles } => format!("granted {}", roles.join(", ")),
            IamOutcome::Skipped(reason) => format!("skipped ({})", reason),
            IamOutcome::PermissionDenied { .. } => "permission denied (see commands above)".to_string(),
            IamOutcome::Failed { .. } => "failed (see commands above)".to_string(),
        };
        rows.push(("IAM roles", text));
    }
    rows
}
