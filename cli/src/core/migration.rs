//! # vmctl Legacy Configuration Import
//!
//! File: cli/src/core/migration.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Earlier generations of this tool kept their settings in `~/.codestation` and,
//! before that, `~/.vmws`. The file format never changed, so importing is a
//! straight copy into the current config directory followed by a `.migrated`
//! marker. The legacy directory is left in place.
//!
//! The import only runs when the user asks for it (`vmctl migrate`). Commands
//! that find no configuration but do find a legacy directory print a hint.
//!
use crate::common::fs::{copy, io};
use crate::core::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Legacy directory names under `$HOME`, most recent first.
pub const LEGACY_DIR_NAMES: [&str; 2] = [".codestation", ".vmws"];
pub const MIGRATION_MARKER: &str = ".migrated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated { from: PathBuf, bytes: u64 },
    AlreadyMigrated,
    NothingToMigrate,
}

/// Imports a legacy config directory into `target_dir`.
#[derive(Debug, Clone)]
pub struct ConfigMigration {
    home: PathBuf,
    target_dir: PathBuf,
}

impl ConfigMigration {
    pub fn new(home: &Path, target_dir: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            target_dir: target_dir.to_path_buf(),
        }
    }

    fn marker(&self) -> PathBuf {
        self.target_dir.join(MIGRATION_MARKER)
    }

    /// The most recent legacy directory that exists.
    pub fn legacy_dir(&self) -> Option<PathBuf> {
        LEGACY_DIR_NAMES
            .iter()
            .map(|name| self.home.join(name))
            .find(|dir| dir.is_dir())
    }

    pub fn needs_migration(&self) -> bool {
        self.legacy_dir().is_some() && !self.marker().exists()
    }

    pub fn migrate(&self) -> Result<MigrationOutcome> {
        let Some(source) = self.legacy_dir() else {
            return Ok(MigrationOutcome::NothingToMigrate);
        };
        if self.marker().exists() {
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        info!(
            "Migrating configuration from {} to {}",
            source.display(),
            self.target_dir.display()
        );
        io::ensure_dir_exists(&self.target_dir)?;
        let bytes = copy::copy_directory_contents(&source, &self.target_dir)?;
        io::write_string_to_file(
            &self.marker(),
            &format!(
                "Configuration migrated from {}\nOriginal directory preserved for rollback\n",
                source.display()
            ),
        )?;

        Ok(MigrationOutcome::Migrated {
            from: source,
            bytes,
        })
    }
}
