//! # vmctl Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Local recursive copies, used when importing a legacy configuration directory
//! into `~/.vmctl`. The heavy lifting is done by `fs_extra`, configured to merge
//! into an existing target and overwrite files that are already there.
//!
use crate::core::error::Result;
use std::path::Path;
use tracing::info;

/// Copies the *contents* of `source` into `target`, overwriting existing files.
///
/// `target` is created if missing. Returns the number of bytes copied.
pub fn copy_directory_contents(source: &Path, target: &Path) -> Result<u64> {
    info!(
        "Copying contents of {} into {}",
        source.display(),
        target.display()
    );

    let mut options = fs_extra::dir::CopyOptions::new();
    options.overwrite = true;
    options.content_only = true;

    std::fs::create_dir_all(target).map_err(|e| {
        anyhow::anyhow!(e).context(format!("Failed to create {}", target.display()))
    })?;
    let copied = fs_extra::dir::copy(source, target, &options).map_err(|e| {
        anyhow::anyhow!(e).context(format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        ))
    })?;

    info!("Copied {} bytes", copied);
    Ok(copied)
}
