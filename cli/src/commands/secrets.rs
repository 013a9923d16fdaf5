//! # vmctl Secrets Command
//!
//! File: cli/src/commands/secrets.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Manages the gateway app's secrets file on the host,
//! `/srv/vmctl/agent/openclaw-gateway/secrets/agent.env`. `vmctl setup`
//! creates it empty with mode 600; this command fills it in.
//!
//! - `--set KEY=VALUE` (repeatable) adds or replaces entries. The file stays
//!   mode 600.
//! - `--list` prints the key names, never the values. This is the default.
//! - `--edit` opens `$EDITOR` (else `nano`) on the file in an interactive session.
//!
//! Values travel to the host as arguments of the remote command, so they can
//! show up in the host's process list while the update runs.
//!
//! ## Usage
//!
//! ```bash
//! vmctl secrets --set OPENAI_API_KEY=sk-... --set SLACK_TOKEN=xoxb-...
//! vmctl secrets --list
//! vmctl secrets --edit
//! ```
//!
use super::CommandContext;
use crate::common::process::{run_attached, AttachedExit, InterruptPolicy, SystemRunner};
use crate::common::transport::{select_transport, RemoteTransport};
use crate::core::error::{Result, VmctlError};
use crate::core::templating::{render_script, RemoteScript};
use crate::deploy::apps::AgentLayout;
use crate::deploy::steps;
use anyhow::anyhow;
use clap::Parser;
use serde::Serialize;
use tera::Context;

/// One `KEY=VALUE` pair from `--set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretEntry {
    pub key: String,
    pub value: String,
}

/// Accepts `KEY=VALUE` with a shell-style variable name as the key.
fn parse_secret_entry(raw: &str) -> std::result::Result<SecretEntry, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not in KEY=VALUE form", raw))?;
    let key = key.trim();
    let mut chars = key.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!(
            "'{}' is not a valid key (letters, digits and '_', not starting with a digit)",
            key
        ));
    }
    Ok(SecretEntry {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Parser, Debug)]
pub struct SecretsArgs {
    /// Set a secret (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_secret_entry)]
    set: Vec<SecretEntry>,

    /// List secret names
    #[arg(long, conflicts_with = "edit")]
    list: bool,

    /// Edit the secrets file in $EDITOR on the host
    #[arg(long, conflicts_with = "set")]
    edit: bool,
}

pub async fn handle_secrets(args: SecretsArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.require_config()?;
    let runner = SystemRunner;
    let transport = select_transport(&config, &runner);
    transport.ensure_ready()?;
    let layout = AgentLayout::gateway();

    if args.edit {
        let mut context = Context::new();
        context.insert("secrets_file", &layout.secrets_file);
        let script = render_script(RemoteScript::SecretsEdit, &context)?;
        let argv = transport.session_argv(Some(&script), true);
        let exit = run_attached(&argv, InterruptPolicy::Inherit).await?;
        return edit_result(exit, &layout.secrets_file);
    }

    if !args.set.is_empty() {
        set_secrets(transport.as_ref(), &layout.secrets_file, &args.set)?;
        let keys: Vec<&str> = args.set.iter().map(|e| e.key.as_str()).collect();
        println!("Set {}", keys.join(", "));
        println!("Restart the gateway to pick them up: vmctl restart --app-dir /srv/vmctl/apps/openclaw-gateway");
        if !args.list {
            return Ok(());
        }
    }

    let keys = list_secret_keys(transport.as_ref(), &layout.secrets_file)?;
    if keys.is_empty() {
        println!("No secrets set in {}", layout.secrets_file);
        println!("Add one with: vmctl secrets --set KEY=VALUE");
    } else {
        println!("Secrets in {}:", layout.secrets_file);
        for key in keys {
            println!("  {}", key);
        }
    }
    Ok(())
}

/// The editor session exits non-zero when ssh, the editor or the final
/// `chmod` fails.
fn edit_result(exit: AttachedExit, secrets_file: &str) -> Result<()> {
    match exit {
        AttachedExit::Completed { success: false } => Err(anyhow!(VmctlError::StepFailed {
            step: format!("Editing {}", secrets_file),
            detail: "the remote editor session exited with a non-zero status".to_string(),
        })),
        _ => Ok(()),
    }
}

fn set_secrets(transport: &dyn RemoteTransport, secrets_file: &str, entries: &[SecretEntry]) -> Result<()> {
    let mut context = Context::new();
    context.insert("secrets_file", secrets_file);
    context.insert("entries", entries);
    steps::run_script(transport, "Updating secrets", RemoteScript::SecretsSet, &context)?;
    Ok(())
}

fn list_secret_keys(transport: &dyn RemoteTransport, secrets_file: &str) -> Result<Vec<String>> {
    let mut context = Context::new();
    context.insert("secrets_file", secrets_file);
    let output = steps::run_script(transport, "Listing secrets", RemoteScript::SecretsList, &context)?;
    Ok(output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::CommandOutput;
    use crate::common::transport::mock::{MockTransport, TransportCall};

    #[test]
    fn test_parse_secret_entry() {
        assert_eq!(
            parse_secret_entry("API_KEY=a=b c").unwrap(),
            SecretEntry {
                key: "API_KEY".into(),
                value: "a=b c".into()
            }
        );
        assert_eq!(parse_secret_entry("_X=").unwrap().value, "");
        assert!(parse_secret_entry("NOVALUE").is_err());
        assert!(parse_secret_entry("1KEY=x").is_err());
        assert!(parse_secret_entry("BAD-KEY=x").is_err());
        assert!(parse_secret_entry("=x").is_err());
    }

    #[test]
    fn test_secrets_args() {
        let args = SecretsArgs::try_parse_from(["secrets", "--set", "A=1", "--set", "B=2"]).unwrap();
        assert_eq!(args.set.len(), 2);
        assert!(SecretsArgs::try_parse_from(["secrets", "--set", "A=1", "--edit"]).is_err());
        assert!(SecretsArgs::try_parse_from(["secrets", "--list", "--edit"]).is_err());
        assert!(SecretsArgs::try_parse_from(["secrets", "--set", "9=1"]).is_err());
    }

    #[test]
    fn test_set_script_quotes_values() {
        let transport = MockTransport::new();
        let entries = vec![SecretEntry {
            key: "TOKEN".into(),
            value: "it's $secret".into(),
        }];
        set_secrets(&transport, "/srv/vmctl/agent/x/secrets/agent.env", &entries).unwrap();
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_exec_containing("printf '%s=%s\\n' TOKEN 'it'\\''s $secret'"));
        assert!(calls[0].is_exec_containing("chmod 600"));
    }

    #[test]
    fn test_edit_result_maps_failure() {
        let err = edit_result(AttachedExit::Completed { success: false }, "/x/agent.env").unwrap_err();
        assert!(err.to_string().starts_with("Editing /x/agent.env failed"));
        assert!(edit_result(AttachedExit::Completed { success: true }, "/x/agent.env").is_ok());
        assert!(edit_result(AttachedExit::Interrupted, "/x/agent.env").is_ok());
    }

    #[test]
    fn test_list_keys() {
        let transport = MockTransport::with_responder(|call| match call {
            TransportCall::Exec(_) => CommandOutput::ok("API_KEY\n\nSLACK_TOKEN"),
            TransportCall::Copy { .. } => CommandOutput::failed("unexpected"),
        });
        assert_eq!(
            list_secret_keys(&transport, "/x/agent.env").unwrap(),
            vec!["API_KEY", "SLACK_TOKEN"]
        );
    }

    #[test]
    fn test_list_failure_surfaces_message() {
        let transport = MockTransport::with_responder(|_| {
            CommandOutput::failed("Error: /x/agent.env not found. Run 'vmctl setup' first.")
        });
        let err = list_secret_keys(&transport, "/x/agent.env").unwrap_err();
        assert!(err.to_string().contains("Run 'vmctl setup' first"));
    }
}
