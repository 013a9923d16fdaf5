//! # vmctl Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Every `vmctl` subcommand lives under this module. Each one defines a clap
//! `XArgs` struct and an async `handle_x(args, ctx)` function that `main.rs`
//! dispatches to.
//!
//! ## Command Groups
//!
//! - `config`: view and change the saved settings.
//! - `vm`: instance lifecycle (`start`, `stop`, `status`, `delete`), `ssh`, `tunnel`.
//! - `backup`: data disk snapshots (`backup`, `restore`, `snapshots`).
//! - `app`: single-app operations on the host (`provision`, `deploy`, `ps`, `logs`, `restart`).
//! - `setup`: multi-app provisioning and deployment.
//! - `secrets`: the gateway app's secrets file.
//! - `migrate`: import settings from an earlier version of the tool.
//!
//! `CommandContext` carries what every handler needs before it starts: where
//! the configuration lives. Handlers that need a saved configuration call
//! `CommandContext::require_config`.
//!
use crate::core::config::{ConfigManager, ConfigPaths, VmConfig};
use crate::core::error::{Result, VmctlError};
use crate::core::migration::ConfigMigration;
use std::path::Path;
use tracing::debug;

pub mod app;
pub mod backup;
pub mod config;
pub mod migrate;
pub mod secrets;
pub mod setup;
pub mod vm;

/// Per-invocation state handed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    paths: ConfigPaths,
}

impl CommandContext {
    pub fn new(config_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            paths: ConfigPaths::resolve(config_dir)?,
        })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn manager(&self) -> ConfigManager {
        ConfigManager::new(self.paths.clone())
    }

    pub fn migration(&self) -> Option<ConfigMigration> {
        dirs::home_dir().map(|home| ConfigMigration::new(&home, &self.paths.config_dir))
    }

    /// Loads the saved configuration. When there is none but an earlier
    /// version's settings exist, points the user at `vmctl migrate`.
    pub fn require_config(&self) -> Result<VmConfig> {
        let manager = self.manager();
        if !manager.exists() {
            if let Some(legacy) = self.migration().and_then(|m| m.legacy_dir()) {
                eprintln!(
                    "Found settings from an earlier version in {}. Import them with: vmctl migrate",
                    legacy.display()
                );
            }
            return Err(anyhow::anyhow!(VmctlError::NoConfig));
        }
        let config = manager.load()?;
        debug!("Using configuration from {}", self.paths.config_file.display());
        Ok(config)
    }
}
