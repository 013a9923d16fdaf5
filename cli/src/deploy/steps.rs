//! # Setup Steps (`deploy::steps`)
//!
//! File: cli/src/deploy/steps.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Each function here is one remote step of `vmctl setup` (and of the
//! standalone `provision` / `deploy` commands). A step renders its script,
//! sends it through the transport and turns a failed `CommandOutput` into
//! `VmctlError::StepFailed`. Successful output is handed back so the caller
//! can echo it.
//!
//! ## Directory sync
//!
//! `scp -r src host:dir` lands `src` *inside* `dir` when `dir/<basename>`
//! already exists, so a second sync would nest the bundle a level deeper.
//! `sync_directory` always clears the destination first:
//!
//! - basename matches the destination name: clear `dest`, copy into its parent.
//! - basename differs (e.g. a gateway checkout called `openclaw` synced to
//!   `repo`): copy into a staging directory, then move the staged tree onto
//!   `dest`.
//!
//! Running the same sync twice leaves the same tree.
//!
use super::apps::AgentLayout;
use crate::common::process::CommandOutput;
use crate::common::transport::RemoteTransport;
use crate::core::error::{Result, VmctlError};
use crate::core::templating::{render_script, RemoteScript};
use anyhow::anyhow;
use std::path::Path;
use tera::Context;
use tracing::{debug, info};

/// Name of the scratch directory used for renaming syncs.
pub const STAGING_DIR_NAME: &str = ".vmctl-staging";

/// What the placeholder secrets file looked like after setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsStatus {
    /// At least one `KEY=value` line.
    Present,
    /// File exists with no assignments.
    Empty,
    Missing,
    /// The check itself could not run.
    Unknown(String),
}

fn step_failed(step: impl Into<String>, output: &CommandOutput) -> anyhow::Error {
    anyhow!(VmctlError::StepFailed {
        step: step.into(),
        detail: output.failure_detail(),
    })
}

/// Renders `script`, runs it remotely, and lifts a failure into `StepFailed`.
pub fn run_script(
    transport: &dyn RemoteTransport,
    step: &str,
    script: RemoteScript,
    context: &Context,
) -> Result<CommandOutput> {
    let rendered = render_script(script, context)?;
    debug!("Running step '{}' on {}", step, transport.target());
    let output = transport.exec(&rendered);
    if output.success {
        Ok(output)
    } else {
        Err(step_failed(step, &output))
    }
}

/// Installs the container runtime and prepares the base directory. Safe to repeat.
pub fn provision(transport: &dyn RemoteTransport, base_dir: &str) -> Result<CommandOutput> {
    let mut context = Context::new();
    context.insert("base_dir", base_dir);
    run_script(transport, "Provisioning", RemoteScript::Provision, &context)
}

/// Creates the remote app and agent directories and the secrets placeholder.
pub fn bootstrap_directories(
    transport: &dyn RemoteTransport,
    layout: &AgentLayout,
) -> Result<CommandOutput> {
    let mut context = Context::new();
    context.insert("dirs", &layout.directories());
    context.insert("shared_dirs", &layout.shared_directories());
    context.insert("secrets_file", &layout.secrets_file);
    run_script(transport, "Directory bootstrap", RemoteScript::Bootstrap, &context)
}

/// Splits `/a/b/c` into (`/a/b`, `c`).
fn split_remote(dest: &str) -> Result<(&str, &str)> {
    let trimmed = dest.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, name)) if !name.is_empty() => {
            Ok((if parent.is_empty() { "/" } else { parent }, name))
        }
        _ => Err(anyhow!(VmctlError::Validation {
            field: "remote path".into(),
            reason: format!("'{}' has no parent directory", dest),
        })),
    }
}

/// Replaces the remote directory `dest` with the contents of `local`.
pub fn sync_directory(
    transport: &dyn RemoteTransport,
    local: &Path,
    dest: &str,
) -> Result<CommandOutput> {
    let step = format!("Sync of {}", local.display());
    if !local.is_dir() {
        return Err(anyhow!(VmctlError::StepFailed {
            step,
            detail: "local directory does not exist".into(),
        }));
    }
    let local_name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            anyhow!(VmctlError::Validation {
                field: "local path".into(),
                reason: format!("'{}' has no directory name", local.display()),
            })
        })?;
    let (parent, name) = split_remote(dest)?;
    let dest = format!("{}/{}", parent.trim_end_matches('/'), name);

    if local_name == name {
        let mut context = Context::new();
        context.insert("parent", parent);
        context.insert("clear", &dest);
        run_script(transport, &step, RemoteScript::SyncPrepare, &context)?;

        info!("Copying {} to {}", local.display(), dest);
        let output = transport.copy(local, parent, true);
        return if output.success {
            Ok(output)
        } else {
            Err(step_failed(step, &output))
        };
    }

    let staging = format!("{}/{}", parent.trim_end_matches('/'), STAGING_DIR_NAME);
    let staged = format!("{}/{}", staging, local_name);
    let mut context = Context::new();
    context.insert("parent", &staging);
    context.insert("clear", &staged);
    run_script(transport, &step, RemoteScript::SyncPrepare, &context)?;

    info!("Copying {} to {} via {}", local.display(), dest, staging);
    let output = transport.copy(local, &staging, true);
    if !output.success {
        return Err(step_failed(step, &output));
    }

    let mut context = Context::new();
    context.insert("dest", &dest);
    context.insert("staged", &staged);
    context.insert("staging_dir", &staging);
    run_script(transport, &step, RemoteScript::SyncFinish, &context)
}

/// Updates sources and brings the compose project up in `remote_dir`.
pub fn deploy_app(
    transport: &dyn RemoteTransport,
    app: &str,
    remote_dir: &str,
) -> Result<CommandOutput> {
    let mut context = Context::new();
    context.insert("app_dir", remote_dir);
    run_script(
        transport,
        &format!("Deploy of '{}'", app),
        RemoteScript::Deploy,
        &context,
    )
}

/// Looks at the secrets file without reading any values. Never fails.
pub fn check_secrets(transport: &dyn RemoteTransport, secrets_file: &str) -> SecretsStatus {
    let mut context = Context::new();
    context.insert("secrets_file", secrets_file);
    let script = match render_script(RemoteScript::SecretsCheck, &context) {
        Ok(script) => script,
        Err(e) => return SecretsStatus::Unknown(e.to_string()),
    };
    let output = transport.exec(&script);
    if !output.success {
        return SecretsStatus::Unknown(output.failure_detail());
    }
    match output.stdout.lines().last().map(str::trim) {
        Some("OK") => SecretsStatus::Present,
        Some("EMPTY") => SecretsStatus::Empty,
        Some("MISSING") => SecretsStatus::Missing,
        other => SecretsStatus::Unknown(format!("unexpected check output: {:?}", other)),
    }
}
