//! # vmctl Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Foundational pieces shared by every command:
//! - `config`: loading, validating, updating and saving `~/.vmctl/config`
//! - `error`: the `VmctlError` enum and the `Result` alias
//! - `migration`: one-shot import of a legacy config directory
//! - `templating`: rendering of the remote shell scripts
//!
pub mod config;
pub mod error;
pub mod migration;
pub mod templating;
