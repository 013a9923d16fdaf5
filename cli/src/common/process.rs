//! # vmctl Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Every interaction vmctl has with the outside world goes through an external
//! program: `gcloud` for the control plane, `ssh`/`scp` for direct hosts. This
//! module owns how those programs are launched.
//!
//! ## Architecture
//!
//! - **`CommandOutput`**: the captured result of one invocation (`success`,
//!   `stdout`, `stderr`). A non-zero exit is a value, not an error.
//! - **`CommandRunner`**: the seam used by the cloud managers and transports.
//!   `SystemRunner` is the real implementation; tests substitute `MockRunner`.
//! - **`run_attached`**: runs a program with the terminal attached (interactive
//!   shells, `logs --follow`, tunnels). With `InterruptPolicy::StopChild`,
//!   Ctrl+C stops the child and the caller gets `AttachedExit::Interrupted`.
//! - **`probe`**: a short captured invocation bounded by a timeout, used for
//!   status lookups such as the default gcloud project.
//!
use crate::core::error::{Result, VmctlError};
use anyhow::{anyhow, Context};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Captured result of running an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful result carrying `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result carrying `stderr`.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Best single description of why the command failed.
    ///
    /// Prefers stderr. Remote scripts that report on stdout before exiting
    /// (e.g. `echo "Error: ..."; exit 1`) fall back to the last stdout line.
    pub fn failure_detail(&self) -> String {
        if !self.stderr.is_empty() {
            return self.stderr.clone();
        }
        match self.stdout.lines().last() {
            Some(line) if !line.trim().is_empty() => line.trim().to_string(),
            _ => "command exited with a non-zero status".to_string(),
        }
    }
}

/// Runs an external program to completion and captures its output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

/// `CommandRunner` backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        log_invocation(program, args);
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output();

        match result {
            Ok(output) => {
                let captured = CommandOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                };
                debug!(
                    "'{}' exited (success: {}, status: {:?})",
                    program,
                    captured.success,
                    output.status.code()
                );
                captured
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Program '{}' is not installed or not on PATH", program);
                CommandOutput::failed(format!("Command not found: {}", program))
            }
            Err(e) => CommandOutput::failed(format!("Failed to run {}: {}", program, e)),
        }
    }
}

/// What to do when the user presses Ctrl+C during an attached command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptPolicy {
    /// Leave signal handling to the terminal and the child (interactive shells).
    Inherit,
    /// Stop the child and report `AttachedExit::Interrupted`.
    StopChild,
}

/// Outcome of an attached command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachedExit {
    Completed { success: bool },
    Interrupted,
}

/// Runs `argv` with stdin, stdout and stderr inherited from vmctl.
pub async fn run_attached(argv: &[String], interrupt: InterruptPolicy) -> Result<AttachedExit> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        anyhow!(VmctlError::ArgumentParsing(
            "cannot run an empty command line".to_string()
        ))
    })?;
    log_invocation(program, args);

    // Listen before spawning: the child gets the same Ctrl+C from the terminal.
    let mut interrupt_listener = match interrupt {
        InterruptPolicy::Inherit => None,
        InterruptPolicy::StopChild => Some(
            listen_for_interrupt().context("Failed to install the Ctrl+C handler")?,
        ),
    };

    let mut child = tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to launch '{}'", program))?;

    let Some(listener) = interrupt_listener.as_mut() else {
        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed waiting for '{}'", program))?;
        return Ok(AttachedExit::Completed {
            success: status.success(),
        });
    };

    tokio::select! {
        biased;
        _ = listener.recv() => {
            debug!("Interrupt received, stopping '{}'", program);
            if let Err(e) = child.kill().await {
                debug!("Child '{}' already gone: {}", program, e);
            }
            Ok(AttachedExit::Interrupted)
        }
        status = child.wait() => {
            let status = status.with_context(|| format!("Failed waiting for '{}'", program))?;
            if status.success() {
                return Ok(AttachedExit::Completed { success: true });
            }
            // The child may have died from the same Ctrl+C before vmctl saw it.
            if matches!(
                tokio::time::timeout(INTERRUPT_GRACE, listener.recv()).await,
                Ok(Some(()))
            ) {
                debug!("'{}' exited on interrupt", program);
                return Ok(AttachedExit::Interrupted);
            }
            Ok(AttachedExit::Completed { success: false })
        }
    }
}

/// How long a failed attached child waits for a Ctrl+C that raced its exit.
const INTERRUPT_GRACE: Duration = Duration::from_millis(200);

#[cfg(unix)]
fn listen_for_interrupt() -> std::io::Result<tokio::signal::unix::Signal> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn listen_for_interrupt() -> std::io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

/// Runs a short command with a time limit. `None` if it failed to launch or timed out.
pub async fn probe(program: &str, args: &[&str], limit: Duration) -> Option<CommandOutput> {
    debug!("Probing: {} {}", program, args.join(" "));
    let future = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(limit, future).await {
        Ok(Ok(output)) => Some(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Ok(Err(e)) => {
            debug!("Probe '{}' could not start: {}", program, e);
            None
        }
        Err(_) => {
            debug!("Probe '{}' timed out after {:?}", program, limit);
            None
        }
    }
}

// Remote scripts are passed as a single argument; keep them out of debug output.
fn log_invocation(program: &str, args: &[String]) {
    let summary: Vec<&str> = args
        .iter()
        .map(|a| if a.contains('\n') { "<script>" } else { a.as_str() })
        .collect();
    debug!("Running: {} {}", program, summary.join(" "));
    for arg in args.iter().filter(|a| a.contains('\n')) {
        trace!("Script argument:\n{}", arg);
    }
}

/// Test double that records every invocation and answers through a responder.
#[cfg(test)]
pub mod mock {
    use super::{CommandOutput, CommandRunner};
    use std::cell::RefCell;

    type Responder = Box<dyn Fn(&[String]) -> CommandOutput>;

    pub struct MockRunner {
        calls: RefCell<Vec<Vec<String>>>,
        responder: Responder,
    }

    impl MockRunner {
        /// Every command succeeds with empty output.
        pub fn new() -> Self {
            Self::with_responder(|_| CommandOutput::ok(""))
        }

        /// `responder` receives the full argv (program first).
        pub fn with_responder(responder: impl Fn(&[String]) -> CommandOutput + 'static) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                responder: Box::new(responder),
            }
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for MockRunner {
        fn run(&self, program: &str, args: &[String]) -> CommandOutput {
            let mut argv = vec![program.to_string()];
            argv.extend(args.iter().cloned());
            let response = (self.responder)(&argv);
            self.calls.borrow_mut().push(argv);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockRunner;
    use super::*;

    #[test]
    fn test_failure_detail_prefers_stderr() {
        let output = CommandOutput {
            success: false,
            stdout: "step one\nstep two".into(),
            stderr: "permission denied".into(),
        };
        assert_eq!(output.failure_detail(), "permission denied");
    }

    #[test]
    fn test_failure_detail_falls_back_to_last_stdout_line() {
        let output = CommandOutput {
            success: false,
            stdout: "Updating...\nError: No compose file found in /srv/app".into(),
            stderr: String::new(),
        };
        assert_eq!(
            output.failure_detail(),
            "Error: No compose file found in /srv/app"
        );
        assert_eq!(
            CommandOutput::failed("").failure_detail(),
            "command exited with a non-zero status"
        );
    }

    #[test]
    fn test_system_runner_missing_program() {
        let output = SystemRunner.run("vmctl-definitely-not-a-real-binary", &[]);
        assert!(!output.success);
        assert_eq!(
            output.stderr,
            "Command not found: vmctl-definitely-not-a-real-binary"
        );
    }

    #[test]
    fn test_system_runner_captures_output() {
        let output = SystemRunner.run(
            "sh",
            &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()],
        );
        assert!(!output.success);
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }

    #[test]
    fn test_mock_runner_records_calls() {
        let runner = MockRunner::with_responder(|argv| {
            if argv.iter().any(|a| a == "fail") {
                CommandOutput::failed("boom")
            } else {
                CommandOutput::ok("fine")
            }
        });
        assert!(runner.run("gcloud", &["ok".to_string()]).success);
        assert!(!runner.run("gcloud", &["fail".to_string()]).success);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["gcloud".to_string(), "fail".to_string()]);
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let result = probe("sleep", &["5"], Duration::from_millis(100)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_probe_captures_output() {
        let result = probe("sh", &["-c", "echo my-project"], Duration::from_secs(5))
            .await
            .expect("sh should run");
        assert!(result.success);
        assert_eq!(result.stdout, "my-project");
    }

    #[tokio::test]
    async fn test_run_attached_rejects_empty_argv() {
        assert!(run_attached(&[], InterruptPolicy::Inherit).await.is_err());
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_run_attached_reports_child_status() {
        assert_eq!(
            run_attached(&sh("exit 0"), InterruptPolicy::StopChild).await.unwrap(),
            AttachedExit::Completed { success: true }
        );
        assert_eq!(
            run_attached(&sh("exit 3"), InterruptPolicy::Inherit).await.unwrap(),
            AttachedExit::Completed { success: false }
        );
    }

    // The child signals vmctl (its parent) and then exits non-zero, like an
    // ssh session hit by the same terminal Ctrl+C. Kept in one test so no
    // other StopChild run sees these signals.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_ctrl_c_racing_child_exit_counts_as_interrupt() {
        assert_eq!(
            run_attached(&sh("exit 3"), InterruptPolicy::StopChild).await.unwrap(),
            AttachedExit::Completed { success: false }
        );

        let argv = sh("sleep 0.3; kill -INT $PPID; exit 130");
        for attempt in 0..10 {
            let outcome = run_attached(&argv, InterruptPolicy::StopChild).await.unwrap();
            assert_eq!(outcome, AttachedExit::Interrupted, "attempt {}", attempt);
        }
    }
}
