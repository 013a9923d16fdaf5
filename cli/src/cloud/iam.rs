//! # Service Account Role Grants (`cloud::iam`)
//!
//! File: cli/src/cloud/iam.rs
//! Author: Christi Mahu
//!
//! After the gateway app is deployed, its containers call Google APIs with the
//! VM's service account. `InstanceIam` tries to add the roles that account
//! needs. Callers usually lack `resourcemanager.projects.setIamPolicy`, so a
//! permission error is an expected outcome: it is reported with the commands
//! an administrator can run by hand, and setup carries on.
//!
use super::instance::InstanceManager;
use super::{args, GcloudCli};
use tracing::{info, warn};

/// Roles granted to the VM's service account for the gateway app.
pub const GATEWAY_ROLES: [&str; 2] = ["roles/aiplatform.user", "roles/logging.logWriter"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IamOutcome {
    Granted { roles: Vec<String> },
    Skipped(String),
    PermissionDenied { commands: Vec<String> },
    Failed { detail: String, commands: Vec<String> },
}

/// Grants project roles to the identity the VM runs as.
pub trait RoleGranter {
    fn grant_roles(&self, roles: &[&str]) -> IamOutcome;
}

pub struct InstanceIam<'a> {
    gcloud: GcloudCli<'a>,
}

impl<'a> InstanceIam<'a> {
    pub fn new(gcloud: GcloudCli<'a>) -> Self {
        Self { gcloud }
    }

    fn binding_args(project: &str, member: &str, role: &str) -> Vec<String> {
        let mut argv = args(["projects", "add-iam-policy-binding", project]);
        argv.push(format!("--member={}", member));
        argv.push(format!("--role={}", role));
        argv.push("--condition=None".to_string());
        argv.push("--quiet".to_string());
        argv
    }
}

impl RoleGranter for InstanceIam<'_> {
    fn grant_roles(&self, roles: &[&str]) -> IamOutcome {
        let Some(project) = self.gcloud.config().project.clone() else {
            return IamOutcome::Skipped("no project configured".to_string());
        };
        let instance = InstanceManager::new(GcloudCli::new(
            self.gcloud.runner(),
            self.gcloud.config(),
        ));
        let email = match instance.service_account() {
            Ok(Some(email)) => email,
            Ok(None) => return IamOutcome::Skipped("VM has no service account".to_string()),
            Err(e) => return IamOutcome::Skipped(format!("could not read service account: {}", e)),
        };
        let member = format!("serviceAccount:{}", email);
        let manual: Vec<String> = roles
            .iter()
            .map(|role| {
                format!(
                    "gcloud projects add-iam-policy-binding {} --member={} --role={}",
                    project, member, role
                )
            })
            .collect();

        let mut granted = Vec::new();
        for role in roles {
            info!("Granting {} to {}", role, member);
            let output = self
                .gcloud
                .run(Self::binding_args(&project, &member, role));
            if output.success {
                granted.push(role.to_string());
                continue;
            }
            if is_permission_denied(&output.stderr) {
                warn!("Not allowed to grant {} in project {}", role, project);
                return IamOutcome::PermissionDenied { commands: manual };
            }
            return IamOutcome::Failed {
                detail: output.failure_detail(),
                commands: manual,
            };
        }
        IamOutcome::Granted { roles: granted }
    }
}

fn is_permission_denied(stderr: &str) -> bool {
    stderr.contains("PERMISSION_DENIED") || stderr.contains("does not have permission")
}
