//! # vmctl Remote Transports (`common::transport`)
//!
//! File: cli/src/common/transport/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `RemoteTransport` runs a command on, or copies a path to, the managed
//! host. Two backends exist:
//!
//! - **`ProxiedTransport`**: `gcloud compute ssh/scp --tunnel-through-iap`.
//!   Every call re-authenticates through the cloud control plane.
//! - **`DirectTransport`**: plain `ssh`/`scp` to a configured host, user, key
//!   and port, with interactive host-key prompts disabled.
//!
//! `select_transport` picks the backend from configuration alone: a configured
//! `ssh_host` means direct, anything else means proxied. Nothing is cached.
//!
//! Neither backend retries. A failed call comes back as a `CommandOutput`
//! with `success == false` and the caller decides what that means.
//!
use crate::common::process::{CommandOutput, CommandRunner};
use crate::core::config::VmConfig;
use crate::core::error::Result;
use std::path::Path;

pub mod direct;
#[cfg(test)]
pub mod mock;
pub mod proxied;

pub use direct::DirectTransport;
pub use proxied::ProxiedTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Proxied,
    Direct,
}

/// Command execution and file transfer against the managed host.
pub trait RemoteTransport {
    fn backend(&self) -> Backend;

    /// Human-readable target, for progress output.
    fn target(&self) -> String;

    /// Runs `command` through the remote login shell.
    fn exec(&self, command: &str) -> CommandOutput;

    /// Copies `local` into the existing remote directory `remote_dir`.
    fn copy(&self, local: &Path, remote_dir: &str, recursive: bool) -> CommandOutput;

    /// Fails unless the host can take remote commands right now.
    fn ensure_ready(&self) -> Result<()>;

    /// Full argv for an attached session (interactive shell, `logs -f`, an editor).
    fn session_argv(&self, command: Option<&str>, tty: bool) -> Vec<String>;
}

/// The transport the configuration calls for.
pub fn select_transport<'a>(
    config: &'a VmConfig,
    runner: &'a dyn CommandRunner,
) -> Box<dyn RemoteTransport + 'a> {
    if config.uses_direct_ssh() {
        Box::new(DirectTransport::new(config, runner))
    } else {
        Box::new(ProxiedTransport::new(config, runner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::mock::MockRunner;
    use std::path::PathBuf;

    fn exercise(transport: &dyn RemoteTransport) {
        transport.exec("echo ok");
        transport.copy(&PathBuf::from("/tmp/apps/web"), "/srv/vmctl/apps", true);
    }

    #[test]
    fn test_direct_selected_when_host_set() {
        let runner = MockRunner::new();
        let config = VmConfig {
            ssh_host: Some("10.0.0.5".into()),
            ..VmConfig::default()
        };
        let transport = select_transport(&config, &runner);
        assert_eq!(transport.backend(), Backend::Direct);
        exercise(transport.as_ref());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0], "ssh");
        assert_eq!(calls[1][0], "scp");
        assert!(calls.iter().all(|c| !c.contains(&"gcloud".to_string())
            && !c.contains(&"--tunnel-through-iap".to_string())));
    }

    #[test]
    fn test_proxied_selected_without_host() {
        let runner = MockRunner::new();
        let config = VmConfig::default();
        let transport = select_transport(&config, &runner);
        assert_eq!(transport.backend(), Backend::Proxied);
        exercise(transport.as_ref());

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c[0] == "gcloud"
            && c.contains(&"--tunnel-through-iap".to_string())));
    }
}
