//! # vmctl Status Command
//!
//! File: cli/src/commands/vm/status.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Prints the VM's name, zone, project and instance status. When a direct SSH
//! host is configured it also checks that the host answers over SSH. The host
//! need not be a cloud VM in that case, so a failed instance lookup is shown
//! as `unknown` rather than ending the command.
//!
use crate::cloud::instance::InstanceManager;
use crate::cloud::GcloudCli;
use crate::commands::CommandContext;
use crate::common::process::{CommandRunner, SystemRunner};
use crate::common::transport::{DirectTransport, RemoteTransport};
use crate::common::ui;
use crate::core::config::VmConfig;
use crate::core::error::Result;
use clap::Parser;
use tracing::warn;

#[derive(Parser, Debug)]
pub struct StatusArgs {}

pub async fn handle_status(_args: StatusArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    println!("{}", ui::format_rows(&status_rows(&config, &runner)?));
    Ok(())
}

fn status_rows(config: &VmConfig, runner: &dyn CommandRunner) -> Result<Vec<(&'static str, String)>> {
    let instance = InstanceManager::new(GcloudCli::new(runner, config));
    let status = match instance.status() {
        Ok(Some(status)) => status,
        Ok(None) => "NOT FOUND".to_string(),
        Err(e) if config.uses_direct_ssh() => {
            warn!("Instance lookup failed: {}", e);
            "unknown".to_string()
        }
        Err(e) => return Err(e),
    };

    let mut rows = vec![
        ("VM", config.vm_name.clone()),
        ("Zone", config.zone.clone()),
        (
            "Project",
            config.project.clone().unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("Status", status),
    ];

    if config.uses_direct_ssh() {
        let transport = DirectTransport::new(config, runner);
        let reachable = match transport.ensure_ready() {
            Ok(()) => "reachable".to_string(),
            Err(e) => format!("unreachable ({})", e),
        };
        rows.push(("SSH", format!("{} {}", transport.target(), reachable)));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::mock::MockRunner;
    use crate::common::process::CommandOutput;

    #[test]
    fn test_status_rows_via_iap() {
        let runner = MockRunner::with_responder(|_| CommandOutput::ok("RUNNING"));
        let config = VmConfig::default();
        let rows = status_rows(&config, &runner).unwrap();
        assert!(rows.contains(&("Status", "RUNNING".to_string())));
        assert!(!rows.iter().any(|(label, _)| *label == "SSH"));
    }

    #[test]
    fn test_status_rows_missing_vm() {
        let runner = MockRunner::with_responder(|_| {
            CommandOutput::failed("ERROR: The resource 'projects/p/zones/z/instances/dev-workstation' was not found")
        });
        let rows = status_rows(&VmConfig::default(), &runner).unwrap();
        assert!(rows.contains(&("Status", "NOT FOUND".to_string())));
    }

    #[test]
    fn test_status_rows_direct_host() {
        let runner = MockRunner::with_responder(|argv| {
            if argv[0] == "ssh" {
                CommandOutput::ok("ok")
            } else {
                CommandOutput::failed("Command not found: gcloud")
            }
        });
        let config = VmConfig {
            ssh_host: Some("box.lan".into()),
            ..VmConfig::default()
        };
        let rows = status_rows(&config, &runner).unwrap();
        assert!(rows.contains(&("Status", "unknown".to_string())));
        assert!(rows.contains(&("SSH", "box.lan reachable".to_string())));
    }

    #[test]
    fn test_status_lookup_failure_is_error_via_iap() {
        let runner = MockRunner::with_responder(|_| CommandOutput::failed("Command not found: gcloud"));
        assert!(status_rows(&VmConfig::default(), &runner).is_err());
    }
}
