//! # vmctl App Deployment (`deploy`)
//!
//! File: cli/src/deploy/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Getting app bundles onto the managed host and running them there.
//!
//! - `apps`: local bundle discovery, the remote directory layout and app lists.
//! - `steps`: the individual remote steps (provision, bootstrap, sync, deploy,
//!   secrets check).
//! - `orchestrator`: the `vmctl setup` plan and the ordered run of steps.
//!
pub mod apps;
pub mod orchestrator;
pub mod steps;
