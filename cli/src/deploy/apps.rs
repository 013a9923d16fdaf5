//! # App Bundles and Remote Layout (`deploy::apps`)
//!
//! File: cli/src/deploy/apps.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! An *app bundle* is a directory under the local `apps/` directory. Its name
//! is the app name, and it carries at least one of:
//! - a `deploy.sh` hook,
//! - a `.git` checkout,
//! - a compose file (`docker-compose.yml`, `docker-compose.yaml`, `compose.yml`, `compose.yaml`).
//!
//! On the host, bundles land under a fixed base:
//!
//! ```text
//! /srv/vmctl/
//! ├── apps/<app>/                       synced bundles
//! └── agent/openclaw-gateway/
//!     ├── repo/                         gateway source checkout
//!     ├── outbox/                       written by the container
//!     ├── state/                        written by the container
//!     └── secrets/agent.env             owner-only placeholder
//! ```
//!
//! ## Locating the local apps directory
//!
//! 1. `--apps-dir` (or `VMCTL_APPS_DIR`) when given.
//! 2. Walk up from the vmctl executable to the nearest directory holding a
//!    `Cargo.toml`, and use its `apps/` if present.
//! 3. `./apps` in the current directory.
//!
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const REMOTE_BASE: &str = "/srv/vmctl";
pub const REMOTE_APPS_DIR: &str = "/srv/vmctl/apps";
pub const REMOTE_AGENT_DIR: &str = "/srv/vmctl/agent";

pub const GATEWAY_APP: &str = "openclaw-gateway";
pub const WORKSTATION_APP: &str = "workstation";
/// Deployment order when `--apps` is not given. The gateway goes first.
pub const DEFAULT_APPS: [&str; 2] = [GATEWAY_APP, WORKSTATION_APP];

pub const PROJECT_ROOT_MARKER: &str = "Cargo.toml";
pub const APPS_DIR_NAME: &str = "apps";

pub const DEPLOY_HOOK: &str = "deploy.sh";
pub const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Remote directory an app is synced to.
pub fn remote_app_dir(app: &str) -> String {
    format!("{}/{}", REMOTE_APPS_DIR, app)
}

/// The agent working area of one app on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLayout {
    pub root: String,
    pub repo: String,
    pub outbox: String,
    pub state: String,
    pub secrets: String,
    pub secrets_file: String,
}

impl AgentLayout {
    pub fn for_app(app: &str) -> Self {
        let root = format!("{}/{}", REMOTE_AGENT_DIR, app);
        Self {
            repo: format!("{}/repo", root),
            outbox: format!("{}/outbox", root),
            state: format!("{}/state", root),
            secrets: format!("{}/secrets", root),
            secrets_file: format!("{}/secrets/agent.env", root),
            root,
        }
    }

    pub fn gateway() -> Self {
        Self::for_app(GATEWAY_APP)
    }

    /// Every directory the bootstrap step creates, parents first.
    pub fn directories(&self) -> Vec<String> {
        vec![
            REMOTE_BASE.to_string(),
            REMOTE_APPS_DIR.to_string(),
            REMOTE_AGENT_DIR.to_string(),
            self.root.clone(),
            self.repo.clone(),
            self.outbox.clone(),
            self.state.clone(),
            self.secrets.clone(),
        ]
    }

    /// Directories the container writes into under its own user namespace.
    pub fn shared_directories(&self) -> Vec<String> {
        vec![self.outbox.clone(), self.state.clone()]
    }
}

/// Splits a comma list, trimming entries and dropping empty ones.
///
/// `None` yields the default order.
pub fn parse_app_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_APPS.iter().map(|s| s.to_string()).collect(),
    }
}

/// App names become remote path components; keep them to one plain segment.
pub fn validate_app_name(name: &str) -> Result<()> {
    let valid = !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(anyhow!(VmctlError::Validation {
            field: "app name".into(),
            reason: format!("'{}' must be a plain directory name", name),
        }))
    }
}

/// Finds the local apps directory. See the module docs for the search order.
pub fn resolve_apps_dir(explicit: Option<&Path>, exe: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        let expanded = PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned());
        return if expanded.is_dir() {
            Ok(expanded)
        } else {
            Err(anyhow!(VmctlError::AppsDirNotFound(
                expanded.display().to_string()
            )))
        };
    }

    if let Some(root) = exe.and_then(Path::parent).and_then(find_project_root) {
        let candidate = root.join(APPS_DIR_NAME);
        if candidate.is_dir() {
            debug!("Using apps directory from project root: {}", candidate.display());
            return Ok(candidate);
        }
        debug!("Project root {} has no apps directory", root.display());
    }

    let fallback = cwd.join(APPS_DIR_NAME);
    if fallback.is_dir() {
        return Ok(fallback);
    }
    Err(anyhow!(VmctlError::AppsDirNotFound(format!(
        "no --apps-dir given and no '{}' directory next to the vmctl project or in {}",
        APPS_DIR_NAME,
        cwd.display()
    ))))
}

/// Nearest ancestor of `start` (inclusive) containing the project marker.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_ROOT_MARKER).is_file())
        .map(Path::to_path_buf)
}

/// How an app brings itself up on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDescriptor {
    DeployHook,
    GitCheckout,
    Compose(String),
    /// Nothing recognizable; the remote deploy script will reject it.
    Missing,
}

impl BuildDescriptor {
    pub fn detect(dir: &Path) -> Self {
        if dir.join(DEPLOY_HOOK).is_file() {
            return BuildDescriptor::DeployHook;
        }
        if dir.join(".git").exists() {
            return BuildDescriptor::GitCheckout;
        }
        COMPOSE_FILES
            .iter()
            .find(|f| dir.join(f).is_file())
            .map(|f| BuildDescriptor::Compose(f.to_string()))
            .unwrap_or(BuildDescriptor::Missing)
    }

    pub fn describe(&self) -> String {
        match self {
            BuildDescriptor::DeployHook => format!("{} hook", DEPLOY_HOOK),
            BuildDescriptor::GitCheckout => "git checkout".to_string(),
            BuildDescriptor::Compose(file) => file.clone(),
            BuildDescriptor::Missing => "no deploy hook or compose file".to_string(),
        }
    }
}

/// A local app bundle discovered at setup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDescriptor {
    pub name: String,
    pub local_path: PathBuf,
    pub build: BuildDescriptor,
}

impl AppDescriptor {
    pub fn discover(apps_dir: &Path, name: &str) -> Result<Self> {
        validate_app_name(name)?;
        let local_path = apps_dir.join(name);
        if !local_path.is_dir() {
            return Err(anyhow!(VmctlError::AppNotFound {
                name: name.to_string(),
                apps_dir: apps_dir.display().to_string(),
            }));
        }
        Ok(Self {
            name: name.to_string(),
            build: BuildDescriptor::detect(&local_path),
            local_path,
        })
    }

    pub fn remote_dir(&self) -> String {
        remote_app_dir(&self.name)
    }
}

/// File count and total bytes under `dir`.
pub fn bundle_summary(dir: &Path) -> (usize, u64) {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .fold((0, 0), |(count, bytes), entry| {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (count + 1, bytes + size)
        })
}

/// `1.4 MB`-style size for progress lines.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
