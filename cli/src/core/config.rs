//! # vmctl Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module loads, validates, updates and saves the per-user VM configuration.
//! One file describes one managed host:
//!
//! ```text
//! ~/.vmctl/config
//! VM_NAME="dev-workstation"
//! ZONE="us-central1-a"
//! PROJECT="my-project"
//! SSH_HOST="10.0.0.5"
//! ```
//!
//! The file is plain `KEY="value"` lines so that older shell tooling can still
//! `source` it.
//!
//! ## Architecture
//!
//! - `VmConfig`: the typed record. Optional settings are `Option<T>`; an unset
//!   field is never written to disk, and an empty value on disk reads back as
//!   `None`. That single rule separates "never configured" from a real value.
//! - `ConfigUpdate`: a partial update (from `vmctl config --zone ...`). Only the
//!   fields that are `Some` change; `Some("")` clears an optional field.
//! - `ConfigPaths` / `ConfigManager`: where the file lives and how it is read
//!   and written. The directory defaults to `~/.vmctl` and can be overridden
//!   with `--config-dir` or `VMCTL_CONFIG_DIR`.
//!
//! Validation runs on parse, on every update and before saving:
//! - VM name: non-empty, starts with a letter, letters/digits/hyphens only,
//!   at most 63 characters, stored lowercase.
//! - Zone: at least three hyphen-separated parts (`us-central1-a`).
//! - SSH port: 1-65535.
//!
use crate::common::fs::io;
use crate::common::process;
use crate::core::error::{Result, VmctlError};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_VM_NAME: &str = "dev-workstation";
pub const DEFAULT_ZONE: &str = "us-central1-a";
pub const CONFIG_DIR_NAME: &str = ".vmctl";
pub const CONFIG_FILE_NAME: &str = "config";

const MAX_VM_NAME_LEN: usize = 63;
const PROJECT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for one managed VM (or direct-SSH host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    pub vm_name: String,
    pub zone: String,
    pub project: Option<String>,
    /// Source workstation disk, kept for migrations from a managed workstation.
    pub workstation_disk: Option<String>,
    pub region: Option<String>,
    /// Default remote compose directory for `deploy`, `ps`, `logs`, `restart`.
    pub app_dir: Option<String>,
    /// When set, every remote operation uses plain SSH to this host.
    pub ssh_host: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_key: Option<String>,
    pub ssh_port: Option<u16>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            vm_name: DEFAULT_VM_NAME.to_string(),
            zone: DEFAULT_ZONE.to_string(),
            project: None,
            workstation_disk: None,
            region: None,
            app_dir: None,
            ssh_host: None,
            ssh_user: None,
            ssh_key: None,
            ssh_port: None,
        }
    }
}

/// Partial update applied on top of an existing `VmConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub vm_name: Option<String>,
    pub zone: Option<String>,
    pub project: Option<String>,
    pub workstation_disk: Option<String>,
    pub region: Option<String>,
    pub app_dir: Option<String>,
    pub ssh_host: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_key: Option<String>,
    pub ssh_port: Option<u16>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }
}

impl VmConfig {
    /// Whether remote operations should bypass the cloud proxy.
    pub fn uses_direct_ssh(&self) -> bool {
        self.ssh_host.is_some()
    }

    /// Checks every invariant and normalizes the record in place.
    pub fn validate(&mut self) -> Result<()> {
        self.vm_name = validate_vm_name(&self.vm_name)?;
        self.zone = validate_zone(&self.zone)?;
        if self.ssh_port == Some(0) {
            return Err(anyhow!(VmctlError::Validation {
                field: "SSH port".into(),
                reason: "must be between 1 and 65535".into(),
            }));
        }
        for field in [
            &mut self.project,
            &mut self.workstation_disk,
            &mut self.region,
            &mut self.app_dir,
            &mut self.ssh_host,
            &mut self.ssh_user,
            &mut self.ssh_key,
        ] {
            normalize_optional(field);
        }
        // One setting per line in the saved file.
        for (label, value) in [
            ("project", &self.project),
            ("workstation disk", &self.workstation_disk),
            ("region", &self.region),
            ("app dir", &self.app_dir),
            ("SSH host", &self.ssh_host),
            ("SSH user", &self.ssh_user),
            ("SSH key", &self.ssh_key),
        ] {
            if value.as_deref().is_some_and(|v| v.chars().any(char::is_control)) {
                return Err(anyhow!(VmctlError::Validation {
                    field: label.into(),
                    reason: "cannot contain control characters such as newlines".into(),
                }));
            }
        }
        Ok(())
    }

    /// Merges `update` into this config and re-validates.
    ///
    /// On error the config is left unchanged.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<()> {
        let mut next = self.clone();
        if let Some(name) = update.vm_name {
            next.vm_name = name;
        }
        if let Some(zone) = update.zone {
            next.zone = zone;
        }
        merge_optional(&mut next.project, update.project);
        merge_optional(&mut next.workstation_disk, update.workstation_disk);
        merge_optional(&mut next.region, update.region);
        merge_optional(&mut next.app_dir, update.app_dir);
        merge_optional(&mut next.ssh_host, update.ssh_host);
        merge_optional(&mut next.ssh_user, update.ssh_user);
        merge_optional(&mut next.ssh_key, update.ssh_key);
        if update.ssh_port.is_some() {
            next.ssh_port = update.ssh_port;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Serializes to `KEY="value"` lines. Unset fields are omitted.
    pub fn to_bash_format(&self) -> String {
        let port = self.ssh_port.map(|p| p.to_string());
        let mut lines = vec![
            format!("VM_NAME=\"{}\"", escape_double_quoted(&self.vm_name)),
            format!("ZONE=\"{}\"", escape_double_quoted(&self.zone)),
        ];
        let optional = [
            ("PROJECT", self.project.as_deref()),
            ("WORKSTATION_DISK", self.workstation_disk.as_deref()),
            ("REGION", self.region.as_deref()),
            ("APP_DIR", self.app_dir.as_deref()),
            ("SSH_HOST", self.ssh_host.as_deref()),
            ("SSH_USER", self.ssh_user.as_deref()),
            ("SSH_KEY", self.ssh_key.as_deref()),
            ("SSH_PORT", port.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                lines.push(format!("{}=\"{}\"", key, escape_double_quoted(value)));
            }
        }
        lines.join("\n") + "\n"
    }

    /// Parses `KEY="value"` lines into a validated config.
    ///
    /// Blank lines, comments and unknown keys are skipped. Missing `VM_NAME` or
    /// `ZONE` fall back to their defaults.
    pub fn from_bash_format(content: &str) -> Result<Self> {
        let mut config = VmConfig::default();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let Some((key, raw_value)) = line.split_once('=') else {
                debug!("Ignoring config line {} without '='", index + 1);
                continue;
            };
            let value = parse_value(raw_value.trim());
            let value = if value.is_empty() { None } else { Some(value) };

            match key.trim() {
                "VM_NAME" => {
                    if let Some(v) = value {
                        config.vm_name = v;
                    }
                }
                "ZONE" => {
                    if let Some(v) = value {
                        config.zone = v;
                    }
                }
                "PROJECT" => config.project = value,
                "WORKSTATION_DISK" => config.workstation_disk = value,
                "REGION" => config.region = value,
                "APP_DIR" => config.app_dir = value,
                "SSH_HOST" => config.ssh_host = value,
                "SSH_USER" => config.ssh_user = value,
                "SSH_KEY" => config.ssh_key = value,
                "SSH_PORT" => {
                    config.ssh_port = match value {
                        Some(v) => Some(v.parse::<u16>().map_err(|_| {
                            anyhow!(VmctlError::Config(format!(
                                "SSH_PORT on line {} is not a valid port: '{}'",
                                index + 1,
                                v
                            )))
                        })?),
                        None => None,
                    }
                }
                other => debug!("Ignoring unknown config key '{}'", other),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// `(label, value)` rows for `vmctl config --show`.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(not set)".to_string());
        vec![
            ("VM name", self.vm_name.clone()),
            ("Zone", self.zone.clone()),
            ("Project", show(&self.project)),
            ("Workstation disk", show(&self.workstation_disk)),
            ("Region", show(&self.region)),
            ("App dir", show(&self.app_dir)),
            ("SSH host", show(&self.ssh_host)),
            ("SSH user", show(&self.ssh_user)),
            ("SSH key", show(&self.ssh_key)),
            (
                "SSH port",
                self.ssh_port
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "(not set)".to_string()),
            ),
        ]
    }
}

/// Validates a GCE instance name and returns it lowercased.
pub fn validate_vm_name(name: &str) -> Result<String> {
    let invalid = |reason: &str| {
        anyhow!(VmctlError::Validation {
            field: "VM name".into(),
            reason: reason.into(),
        })
    };
    let first = name.chars().next().ok_or_else(|| invalid("cannot be empty"))?;
    if !first.is_ascii_alphabetic() {
        return Err(invalid("must start with a letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("can only contain letters, numbers, and hyphens"));
    }
    if name.len() > MAX_VM_NAME_LEN {
        return Err(invalid("cannot exceed 63 characters"));
    }
    Ok(name.to_ascii_lowercase())
}

/// Validates a zone of the form `region-zone-letter`.
pub fn validate_zone(zone: &str) -> Result<String> {
    let invalid = |reason: &str| {
        anyhow!(VmctlError::Validation {
            field: "zone".into(),
            reason: reason.into(),
        })
    };
    if zone.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    let parts: Vec<&str> = zone.split('-').collect();
    if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid(&format!(
            "'{}' does not look like region-zone-letter (e.g. us-central1-a)",
            zone
        )));
    }
    Ok(zone.to_string())
}

fn normalize_optional(field: &mut Option<String>) {
    if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
    }
}

fn merge_optional(target: &mut Option<String>, update: Option<String>) {
    if let Some(value) = update {
        *target = if value.is_empty() { None } else { Some(value) };
    }
}

fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_value(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    if matches!(next, '\\' | '"' | '$' | '`') {
                        value.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            value.push(c);
        }
        value
    } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

/// Filesystem locations of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// Uses `override_dir` if given, else `~/.vmctl`.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self> {
        match override_dir {
            Some(dir) => Ok(Self::in_dir(dir)),
            None => {
                let home = dirs::home_dir().ok_or_else(|| {
                    anyhow!(VmctlError::Config(
                        "Could not determine the home directory".to_string()
                    ))
                })?;
                Ok(Self::in_dir(&home.join(CONFIG_DIR_NAME)))
            }
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_dir: dir.to_path_buf(),
            config_file: dir.join(CONFIG_FILE_NAME),
        }
    }
}

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    paths: ConfigPaths,
}

impl ConfigManager {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn exists(&self) -> bool {
        self.paths.config_file.is_file()
    }

    /// Loads the saved configuration. Fails with `NoConfig` if nothing was saved.
    pub fn load(&self) -> Result<VmConfig> {
        if !self.exists() {
            return Err(anyhow!(VmctlError::NoConfig));
        }
        let content = io::read_file_to_string(&self.paths.config_file)?;
        let config = VmConfig::from_bash_format(&content).with_context(|| {
            format!(
                "Invalid configuration in {}",
                self.paths.config_file.display()
            )
        })?;
        debug!("Loaded configuration for VM '{}'", config.vm_name);
        Ok(config)
    }

    /// Loads the saved configuration, or builds defaults (probing gcloud for
    /// the active project) when none exists yet.
    pub async fn load_or_default(&self) -> Result<VmConfig> {
        if self.exists() {
            return self.load();
        }
        info!("No configuration file yet, starting from defaults");
        Ok(VmConfig {
            project: detect_default_project().await,
            ..VmConfig::default()
        })
    }

    pub fn save(&self, config: &VmConfig) -> Result<()> {
        let mut validated = config.clone();
        validated.validate()?;
        io::ensure_dir_exists(&self.paths.config_dir)?;
        io::write_string_to_file(&self.paths.config_file, &validated.to_bash_format())?;
        info!("Saved configuration to {}", self.paths.config_file.display());
        Ok(())
    }

    /// Loads (or defaults), applies `update`, saves, and returns the result.
    pub async fn update(&self, update: ConfigUpdate) -> Result<VmConfig> {
        let mut config = self.load_or_default().await?;
        config.apply(update)?;
        self.save(&config)?;
        Ok(config)
    }
}

/// Active project from `gcloud config get-value project`, if any.
pub async fn detect_default_project() -> Option<String> {
    let output = process::probe(
        "gcloud",
        &["config", "get-value", "project"],
        PROJECT_PROBE_TIMEOUT,
    )
    .await?;
    let project = output.stdout.lines().last().unwrap_or("").trim().to_string();
    if !output.success || project.is_empty() || project == "(unset)" {
        return None;
    }
    Some(project)
}
