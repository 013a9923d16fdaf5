//! # vmctl Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared building blocks used by command handlers and the deploy pipeline:
//!
//! - **`fs`**: local filesystem helpers (`io`, `copy`).
//! - **`process`**: running local programs, captured or attached to the terminal.
//! - **`transport`**: running commands on, and copying files to, the managed host.
//! - **`ui`**: confirmation prompts and aligned key/value output.
//!
pub mod fs;
pub mod process;
pub mod transport;
pub mod ui;
