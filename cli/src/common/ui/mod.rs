//! # vmctl Terminal Helpers (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Small terminal helpers shared by command handlers:
//!
//! - `confirm`: a `[y/N]` prompt for destructive commands (`delete`, `restore`).
//!   Passing `--yes` skips it. Only `y` or `yes` (any case) counts as consent.
//! - `format_rows`: aligned `label: value` rows for `config --show` and `status`.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Asks `question` on stdout and reads the answer from stdin.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_with(question, &mut stdin.lock(), &mut stdout.lock())
}

/// `confirm` over explicit streams. End of input counts as "no".
pub fn confirm_with(question: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<bool> {
    write!(output, "{} [y/N]: ", question).context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Formats `(label, value)` pairs with the values aligned in one column.
pub fn format_rows<L: AsRef<str>>(rows: &[(L, String)]) -> String {
    let width = rows
        .iter()
        .map(|(label, _)| label.as_ref().len())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            format!(
                "  {:<width$}  {}",
                format!("{}:", label.as_ref()),
                value,
                width = width + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
