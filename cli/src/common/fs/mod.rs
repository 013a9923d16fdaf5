//! # vmctl Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! Local filesystem helpers:
//!
//! - **`copy`**: recursive directory copies (`fs_extra`), used by `vmctl migrate`.
//! - **`io`**: directory creation and file read/write with path context.
//!

pub mod copy;
pub mod io;
