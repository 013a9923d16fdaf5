//! # vmctl Backup Commands
//!
//! File: cli/src/commands/backup/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Snapshots of the VM's data disk (`<vm>-disk`):
//!
//! - `backup`: snapshot the disk as `<vm>-backup-YYYYmmdd-HHMMSS`.
//! - `snapshots`: list this VM's backups, newest first.
//! - `restore <snapshot>`: replace the data disk with one built from a snapshot.
//!
//! ## Usage
//!
//! ```bash
//! vmctl backup --description "before upgrade"
//! vmctl snapshots
//! vmctl restore dev-workstation-backup-20250101-120000 --yes
//! ```
//!
pub mod create;
pub mod restore;
pub mod snapshots;
