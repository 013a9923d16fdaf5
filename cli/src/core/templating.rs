//! # vmctl Remote Script Templates
//!
//! File: cli/src/core/templating.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything vmctl runs on the remote host is a small POSIX shell script. The
//! scripts live as Tera templates under `core/templates/` and are compiled into
//! the binary with `include_str!`. This module is the only place they are
//! rendered, so every value that reaches a remote shell passes through here.
//!
//! ## Architecture
//!
//! - `RemoteScript` names each template.
//! - `render_script` builds a Tera engine, registers the `shell_quote` filter
//!   and renders one template with the caller's `tera::Context`.
//! - Templates must pipe every interpolated string through `shell_quote`.
//!   Integers and booleans are the only values used bare.
//!
//! Scripts that change state start with `set -e` and end with a status line.
//!
//! ## Usage
//!
//! ```rust
//! let mut context = Context::new();
//! context.insert("app_dir", "/srv/vmctl/apps/web");
//! let script = templating::render_script(RemoteScript::Deploy, &context)?;
//! let output = transport.exec(&script);
//! ```
//!
use crate::core::error::{Result, VmctlError};
use std::collections::HashMap;
use tera::{Context, Tera, Value};
use tracing::trace;

/// The remote shell scripts vmctl knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteScript {
    Provision,
    Bootstrap,
    SyncPrepare,
    SyncFinish,
    Deploy,
    ComposePs,
    ComposeLogs,
    ComposeRestart,
    SecretsCheck,
    SecretsSet,
    SecretsList,
    SecretsEdit,
}

impl RemoteScript {
    fn template_name(self) -> &'static str {
        match self {
            RemoteScript::Provision => "provision.sh",
            RemoteScript::Bootstrap => "bootstrap.sh",
            RemoteScript::SyncPrepare => "sync_prepare.sh",
            RemoteScript::SyncFinish => "sync_finish.sh",
            RemoteScript::Deploy => "deploy.sh",
            RemoteScript::ComposePs => "compose_ps.sh",
            RemoteScript::ComposeLogs => "compose_logs.sh",
            RemoteScript::ComposeRestart => "compose_restart.sh",
            RemoteScript::SecretsCheck => "secrets_check.sh",
            RemoteScript::SecretsSet => "secrets_set.sh",
            RemoteScript::SecretsList => "secrets_list.sh",
            RemoteScript::SecretsEdit => "secrets_edit.sh",
        }
    }
}

const TEMPLATES: [(&str, &str); 12] = [
    ("provision.sh", include_str!("templates/provision.sh.tera")),
    ("bootstrap.sh", include_str!("templates/bootstrap.sh.tera")),
    ("sync_prepare.sh", include_str!("templates/sync_prepare.sh.tera")),
    ("sync_finish.sh", include_str!("templates/sync_finish.sh.tera")),
    ("deploy.sh", include_str!("templates/deploy.sh.tera")),
    ("compose_ps.sh", include_str!("templates/compose_ps.sh.tera")),
    ("compose_logs.sh", include_str!("templates/compose_logs.sh.tera")),
    ("compose_restart.sh", include_str!("templates/compose_restart.sh.tera")),
    ("secrets_check.sh", include_str!("templates/secrets_check.sh.tera")),
    ("secrets_set.sh", include_str!("templates/secrets_set.sh.tera")),
    ("secrets_list.sh", include_str!("templates/secrets_list.sh.tera")),
    ("secrets_edit.sh", include_str!("templates/secrets_edit.sh.tera")),
];

/// Renders one remote script.
pub fn render_script(script: RemoteScript, context: &Context) -> Result<String> {
    let tera = engine()?;
    let rendered = tera
        .render(script.template_name(), context)
        .map_err(VmctlError::from)?;
    trace!("Rendered {}:\n{}", script.template_name(), rendered);
    Ok(rendered)
}

fn engine() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES)
        .map_err(VmctlError::from)?;
    tera.register_filter("shell_quote", shell_quote_filter);
    Ok(tera)
}

fn shell_quote_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(tera::Error::msg(format!(
                "shell_quote expects a scalar, got {}",
                other
            )))
        }
    };
    Ok(Value::String(shell_quote(&text)))
}

/// Quotes `value` for a POSIX shell.
///
/// Values made only of `[A-Za-z0-9_./:%@=+-]` are returned as-is; anything else
/// is wrapped in single quotes with embedded quotes written as `'\''`.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_./:%@=+-".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}
