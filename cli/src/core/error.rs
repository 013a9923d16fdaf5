//! # vmctl Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types shared across vmctl. Two channels exist:
//!
//! - `VmctlError`: a `thiserror` enum for the failures a command cannot recover
//!   from (bad configuration, a VM that is not running, an app bundle that does
//!   not exist locally, a setup step that failed on the remote host).
//! - `Result<T>`: an alias for `anyhow::Result<T>` so handlers can attach
//!   `.context(...)` while propagating.
//!
//! A remote command that merely "did not succeed" is *not* an error at this
//! level. Transports return a `CommandOutput` value and the calling step decides
//! whether the outcome is fatal. Only then is it lifted into a `VmctlError`.
//!
//! ## Examples
//!
//! ```rust
//! if !config_paths.config_file.exists() {
//!     return Err(anyhow!(VmctlError::NoConfig));
//! }
//!
//! let output = transport.exec(&script);
//! if !output.success {
//!     return Err(anyhow!(VmctlError::StepFailed {
//!         step: "provision".into(),
//!         detail: output.failure_detail(),
//!     }));
//! }
//! ```
//!
use thiserror::Error;

/// Domain errors raised by vmctl commands.
#[derive(Error, Debug)]
pub enum VmctlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("No configuration found. Run 'vmctl config' first.")]
    NoConfig,

    #[error("VM '{name}' does not exist.")]
    InstanceNotFound { name: String },

    #[error("VM '{name}' is {status}. Start it first with: vmctl start")]
    InstanceNotRunning { name: String, status: String },

    #[error("Cannot reach {target}: {detail}")]
    Unreachable { target: String, detail: String },

    #[error("Cloud operation failed: {0}")]
    Cloud(String),

    #[error("Apps directory not found: {0}")]
    AppsDirNotFound(String),

    #[error("App '{name}' not found in {apps_dir}")]
    AppNotFound { name: String, apps_dir: String },

    #[error("{step} failed: {detail}")]
    StepFailed { step: String, detail: String },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),

    #[error("No app directory specified. Pass --app-dir or set it with 'vmctl config --app-dir'.")]
    NoAppDir,
}

/// Type alias for Result using anyhow::Error for context-rich propagation.
pub type Result<T> = anyhow::Result<T>;
