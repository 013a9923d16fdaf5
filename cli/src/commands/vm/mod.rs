//! # vmctl VM Commands
//!
//! File: cli/src/commands/vm/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Commands acting on the VM itself rather than on the apps it runs:
//!
//! - `start`, `stop`, `status`, `delete`: instance lifecycle through
//!   `gcloud compute instances`.
//! - `ssh`: an interactive shell or a single command over the active transport.
//! - `tunnel`: an IAP port forward to the workstation's code-server.
//!
//! Each subcommand is a top-level `vmctl` command; this module only groups
//! their implementations.
//!
pub mod delete;
pub mod ssh;
pub mod start;
pub mod status;
pub mod stop;
pub mod tunnel;
