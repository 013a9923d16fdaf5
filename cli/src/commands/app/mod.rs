//! # vmctl App Commands
//!
//! File: cli/src/commands/app/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Commands that act on one app on the host:
//!
//! - `provision`: install Docker and the compose plugin (idempotent).
//! - `deploy`: update sources and `docker compose up -d --build`.
//! - `ps`, `logs`, `restart`: the matching `docker compose` subcommands.
//!
//! All but `provision` work in a remote compose directory: `--app-dir` if
//! given, else the configured `APP_DIR`. The directory is resolved before
//! anything is sent to the host.
//!
//! Every command checks the host is reachable first (`RUNNING` for IAP, an
//! `echo ok` round trip for direct SSH).
//!
use crate::core::config::VmConfig;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;

pub mod deploy;
pub mod logs;
pub mod provision;
pub mod ps;
pub mod restart;

/// Remote compose directory: `--app-dir`, else the configured default.
pub fn resolve_app_dir(explicit: Option<&str>, config: &VmConfig) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
        .or_else(|| config.app_dir.clone())
        .ok_or_else(|| anyhow!(VmctlError::NoAppDir))
}

/// Prints captured remote output, if any.
pub(crate) fn print_output(stdout: &str) {
    if !stdout.trim().is_empty() {
        println!("{}", stdout);
    }
}
