//! # Setup Orchestration (`deploy::orchestrator`)
//!
//! File: cli/src/deploy/orchestrator.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `vmctl setup` turns a bare host into one running every requested app. It
//! runs in two phases.
//!
//! **Plan** (`SetupPlan::prepare`), which is local only:
//! - resolve the apps directory,
//! - parse and validate the app list,
//! - check every bundle (and `--gateway-repo`) exists on disk.
//! Any problem here ends the command before a single remote call is made.
//!
//! **Execute** (`SetupOrchestrator::execute`):
//! 1. Provision the host (unless `--skip-provision`).
//! 2. Bootstrap the remote directory layout, exactly once.
//! 3. For each app, in the order given: sync, then deploy, then the app's
//!    post-deploy hooks. The gateway app syncs its source checkout before its
//!    deploy and afterwards checks its secrets file and grants IAM roles.
//!
//! The first failing step stops everything; later apps are not touched.
//! Secrets and IAM results are reported but never fatal.
//!
use super::apps::{
    bundle_summary, human_size, parse_app_list, resolve_apps_dir, AgentLayout, AppDescriptor,
    BuildDescriptor, GATEWAY_APP, REMOTE_BASE,
};
use super::steps::{self, SecretsStatus};
use crate::cloud::iam::{IamOutcome, RoleGranter, GATEWAY_ROLES};
use crate::common::transport::RemoteTransport;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Setup options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SetupRequest {
    pub apps: Option<String>,
    pub apps_dir: Option<PathBuf>,
    pub skip_provision: bool,
    pub gateway_repo: Option<PathBuf>,
}

/// A validated setup run. Building one touches only the local filesystem.
#[derive(Debug, Clone)]
pub struct SetupPlan {
    pub apps_dir: PathBuf,
    pub apps: Vec<AppDescriptor>,
    pub skip_provision: bool,
    pub gateway_repo: Option<PathBuf>,
    pub layout: AgentLayout,
}

impl SetupPlan {
    pub fn prepare(request: &SetupRequest, exe: Option<&Path>, cwd: &Path) -> Result<Self> {
        let apps_dir = resolve_apps_dir(request.apps_dir.as_deref(), exe, cwd)?;
        let names = parse_app_list(request.apps.as_deref());
        if names.is_empty() {
            return Err(anyhow!(VmctlError::Validation {
                field: "--apps".into(),
                reason: "no app names given".into(),
            }));
        }

        let apps = names
            .iter()
            .map(|name| AppDescriptor::discover(&apps_dir, name))
            .collect::<Result<Vec<_>>>()?;

        let includes_gateway = apps.iter().any(|a| a.name == GATEWAY_APP);
        let gateway_repo = match &request.gateway_repo {
            Some(repo) if includes_gateway => {
                let expanded =
                    PathBuf::from(shellexpand::tilde(&repo.to_string_lossy()).into_owned());
                if !expanded.is_dir() {
                    return Err(anyhow!(VmctlError::Validation {
                        field: "--gateway-repo".into(),
                        reason: format!("{} is not a directory", expanded.display()),
                    }));
                }
                Some(expanded)
            }
            Some(repo) => {
                warn!(
                    "Ignoring --gateway-repo {}: '{}' is not being deployed",
                    repo.display(),
                    GATEWAY_APP
                );
                None
            }
            None => None,
        };

        Ok(Self {
            apps_dir,
            apps,
            skip_provision: request.skip_provision,
            gateway_repo,
            layout: AgentLayout::gateway(),
        })
    }

    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.name.as_str()).collect()
    }
}

/// What a completed setup run did.
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    pub provisioned: bool,
    pub deployed: Vec<String>,
    pub secrets: Option<SecretsStatus>,
    pub iam: Option<IamOutcome>,
}

pub struct SetupOrchestrator<'a> {
    transport: &'a dyn RemoteTransport,
    granter: Option<&'a dyn RoleGranter>,
}

impl<'a> SetupOrchestrator<'a> {
    /// `granter` is `None` when there is no cloud identity to grant roles to
    /// (the direct SSH backend).
    pub fn new(transport: &'a dyn RemoteTransport, granter: Option<&'a dyn RoleGranter>) -> Self {
        Self { transport, granter }
    }

    pub fn execute(&self, plan: &SetupPlan) -> Result<SetupReport> {
        let mut report = SetupReport::default();
        let total = plan.apps.len();

        if plan.skip_provision {
            println!("Skipping provisioning (--skip-provision)");
        } else {
            println!("Provisioning {}...", self.transport.target());
            let output = steps::provision(self.transport, REMOTE_BASE)?;
            echo(&output.stdout);
            report.provisioned = true;
        }

        println!("Preparing remote directories...");
        steps::bootstrap_directories(self.transport, &plan.layout)?;

        for (index, app) in plan.apps.iter().enumerate() {
            println!();
            println!("[{}/{}] {} ({})", index + 1, total, app.name, app.build.describe());
            if app.build == BuildDescriptor::Missing {
                warn!("{} has no deploy hook or compose file; deploy will likely fail", app.name);
            }

            let (files, bytes) = bundle_summary(&app.local_path);
            println!("  Syncing {} files ({})...", files, human_size(bytes));
            steps::sync_directory(self.transport, &app.local_path, &app.remote_dir())?;

            if app.name == GATEWAY_APP {
                if let Some(repo) = &plan.gateway_repo {
                    println!("  Syncing gateway source from {}...", repo.display());
                    steps::sync_directory(self.transport, repo, &plan.layout.repo)?;
                }
            }

            println!("  Deploying...");
            let output = steps::deploy_app(self.transport, &app.name, &app.remote_dir())?;
            echo(&output.stdout);
            report.deployed.push(app.name.clone());
            info!("Deployed {}", app.name);

            if app.name == GATEWAY_APP {
                self.gateway_post_deploy(plan, &mut report);
            }
        }

        Ok(report)
    }

    fn gateway_post_deploy(&self, plan: &SetupPlan, report: &mut SetupReport) {
        let status = steps::check_secrets(self.transport, &plan.layout.secrets_file);
        match &status {
            SecretsStatus::Present => println!("  Secrets file has values"),
            SecretsStatus::Empty | SecretsStatus::Missing => {
                println!("  Secrets file {} has no values yet.", plan.layout.secrets_file);
                println!("  Add them with: vmctl secrets --set KEY=VALUE");
            }
            SecretsStatus::Unknown(detail) => warn!("Could not check secrets file: {}", detail),
        }
        report.secrets = Some(status);

        let Some(granter) = self.granter else {
            return;
        };
        println!("  Granting service account roles...");
        let outcome = granter.grant_roles(&GATEWAY_ROLES);
        match &outcome {
            IamOutcome::Granted { roles } => println!("  Granted: {}", roles.join(", ")),
            IamOutcome::Skipped(reason) => println!("  Skipped role grants: {}", reason),
            IamOutcome::PermissionDenied { commands } => {
                println!("  You lack permission to grant roles. Ask an administrator to run:");
                for command in commands {
                    println!("    {}", command);
                }
            }
            IamOutcome::Failed { detail, commands } => {
                warn!("Role grant failed: {}", detail);
                println!("  Role grant failed. To retry by hand:");
                for command in commands {
                    println!("    {}", command);
                }
            }
        }
        report.iam = Some(outcome);
    }
}

fn echo(stdout: &str) {
    for line in stdout.lines() {
        println!("    {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::CommandOutput;
    use crate::common::transport::mock::{MockTransport, TransportCall};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct RecordingGranter {
        calls: RefCell<usize>,
    }

    impl RoleGranter for RecordingGranter {
        fn grant_roles(&self, roles: &[&str]) -> IamOutcome {
            *self.calls.borrow_mut() += 1;
            IamOutcome::Granted {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            }
        }
    }

    fn apps_dir(names: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for name in names {
            let app = dir.path().join(name);
            fs::create_dir(&app).unwrap();
            fs::write(app.join("compose.yml"), "services: {}\n").unwrap();
        }
        dir
    }

    fn plan(dir: &TempDir, apps: &str, skip_provision: bool) -> SetupPlan {
        let request = SetupRequest {
            apps: Some(apps.to_string()),
            apps_dir: Some(dir.path().to_path_buf()),
            skip_provision,
            gateway_repo: None,
        };
        SetupPlan::prepare(&request, None, dir.path()).unwrap()
    }

    fn copied_bundles(calls: &[TransportCall]) -> Vec<String> {
        calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Copy { local, .. } => {
                    local.file_name().map(|n| n.to_string_lossy().into_owned())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_prepare_rejects_missing_app() {
        let dir = apps_dir(&["a"]);
        let request = SetupRequest {
            apps: Some("a,nonexistent".into()),
            apps_dir: Some(dir.path().to_path_buf()),
            ..SetupRequest::default()
        };
        let err = SetupPlan::prepare(&request, None, dir.path()).unwrap_err();
        assert!(err.to_string().contains("App 'nonexistent' not found"));
    }

    #[test]
    fn test_prepare_rejects_empty_list() {
        let dir = apps_dir(&["a"]);
        let request = SetupRequest {
            apps: Some(" , ".into()),
            apps_dir: Some(dir.path().to_path_buf()),
            ..SetupRequest::default()
        };
        assert!(SetupPlan::prepare(&request, None, dir.path()).is_err());
    }

    #[test]
    fn test_prepare_validates_gateway_repo() {
        let dir = apps_dir(&[GATEWAY_APP]);
        let request = SetupRequest {
            apps: Some(GATEWAY_APP.into()),
            apps_dir: Some(dir.path().to_path_buf()),
            gateway_repo: Some(dir.path().join("no-such-repo")),
            ..SetupRequest::default()
        };
        let err = SetupPlan::prepare(&request, None, dir.path()).unwrap_err();
        assert!(err.to_string().contains("--gateway-repo"));
    }

    #[test]
    fn test_prepare_ignores_gateway_repo_without_gateway() {
        let dir = apps_dir(&["web"]);
        let request = SetupRequest {
            apps: Some("web".into()),
            apps_dir: Some(dir.path().to_path_buf()),
            gateway_repo: Some(dir.path().join("no-such-repo")),
            ..SetupRequest::default()
        };
        let plan = SetupPlan::prepare(&request, None, dir.path()).unwrap();
        assert!(plan.gateway_repo.is_none());
    }

    #[test]
    fn test_apps_processed_in_given_order() {
        let dir = apps_dir(&["a", "b", "c"]);
        let plan = plan(&dir, "c,a,b", false);
        let transport = MockTransport::new();
        let report = SetupOrchestrator::new(&transport, None).execute(&plan).unwrap();

        assert!(report.provisioned);
        assert_eq!(report.deployed, vec!["c", "a", "b"]);
        assert_eq!(copied_bundles(&transport.calls()), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_bootstrap_runs_once_before_any_sync() {
        let dir = apps_dir(&["a", "b"]);
        let plan = plan(&dir, "a,b", true);
        let transport = MockTransport::new();
        SetupOrchestrator::new(&transport, None).execute(&plan).unwrap();

        let calls = transport.calls();
        let bootstraps: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_exec_containing("Agent directories ready"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(bootstraps, vec![0]);
        assert!(!calls.iter().any(|c| c.is_exec_containing("Provisioning complete")));
    }

    #[test]
    fn test_failure_stops_later_apps() {
        let dir = apps_dir(&["a", "b", "c"]);
        let plan = plan(&dir, "a,b,c", true);
        let transport = MockTransport::with_responder(|call| {
            if call.is_exec_containing("docker compose up") && call.is_exec_containing("/apps/b") {
                CommandOutput::failed("Error: No compose file found in /srv/vmctl/apps/b")
            } else {
                CommandOutput::ok("")
            }
        });
        let err = SetupOrchestrator::new(&transport, None)
            .execute(&plan)
            .unwrap_err();
        assert!(err.to_string().contains("Deploy of 'b' failed"));

        let calls = transport.calls();
        assert_eq!(copied_bundles(&calls), vec!["a", "b"]);
        assert!(!calls.iter().any(|c| c.is_exec_containing("/apps/c")));
    }

    #[test]
    fn test_provision_failure_stops_everything() {
        let dir = apps_dir(&["a"]);
        let plan = plan(&dir, "a", false);
        let transport = MockTransport::with_responder(|_| CommandOutput::failed("apt is locked"));
        assert!(SetupOrchestrator::new(&transport, None).execute(&plan).is_err());
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_gateway_hooks_run_after_its_deploy() {
        let dir = apps_dir(&[GATEWAY_APP, "workstation"]);
        let repo = tempdir().unwrap();
        let request = SetupRequest {
            apps: None,
            apps_dir: Some(dir.path().to_path_buf()),
            skip_provision: true,
            gateway_repo: Some(repo.path().to_path_buf()),
        };
        let plan = SetupPlan::prepare(&request, None, dir.path()).unwrap();
        let transport = MockTransport::with_responder(|call| {
            if call.is_exec_containing("SECRETS_FILE=") {
                CommandOutput::ok("EMPTY")
            } else {
                CommandOutput::ok("")
            }
        });
        let granter = RecordingGranter {
            calls: RefCell::new(0),
        };
        let report = SetupOrchestrator::new(&transport, Some(&granter))
            .execute(&plan)
            .unwrap();

        assert_eq!(report.deployed, vec![GATEWAY_APP, "workstation"]);
        assert_eq!(report.secrets, Some(SecretsStatus::Empty));
        assert!(matches!(report.iam, Some(IamOutcome::Granted { .. })));
        assert_eq!(*granter.calls.borrow(), 1);

        let calls = transport.calls();
        let position = |pred: &dyn Fn(&TransportCall) -> bool| calls.iter().position(pred).unwrap();
        let repo_copy = position(&|c: &TransportCall| {
            matches!(c, TransportCall::Copy { remote_dir, .. } if remote_dir.ends_with(".vmctl-staging"))
        });
        let gateway_deploy = position(&|c: &TransportCall| {
            c.is_exec_containing("docker compose up") && c.is_exec_containing(GATEWAY_APP)
        });
        let secrets_check = position(&|c: &TransportCall| c.is_exec_containing("SECRETS_FILE="));
        let workstation_copy = position(&|c: &TransportCall| {
            matches!(c, TransportCall::Copy { local, .. } if local.ends_with("workstation"))
        });
        assert!(repo_copy < gateway_deploy);
        assert!(gateway_deploy < secrets_check);
        assert!(secrets_check < workstation_copy);
    }

    #[test]
    fn test_unreachable_secrets_check_is_not_fatal() {
        let dir = apps_dir(&[GATEWAY_APP]);
        let plan = plan(&dir, GATEWAY_APP, true);
        let transport = MockTransport::with_responder(|call| {
            if call.is_exec_containing("SECRETS_FILE=") {
                CommandOutput::failed("connection reset")
            } else {
                CommandOutput::ok("")
            }
        });
        let report = SetupOrchestrator::new(&transport, None).execute(&plan).unwrap();
        assert!(matches!(report.secrets, Some(SecretsStatus::Unknown(_))));
        assert!(report.iam.is_none());
    }
}
