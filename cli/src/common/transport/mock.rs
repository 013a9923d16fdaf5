//! Recording transport for tests. Every `exec` and `copy` is logged in order
//! and answered by a responder closure.

use super::{Backend, RemoteTransport};
use crate::common::process::CommandOutput;
use crate::core::error::{Result, VmctlError};
use anyhow::anyhow;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Exec(String),
    Copy {
        local: PathBuf,
        remote_dir: String,
        recursive: bool,
    },
}

impl TransportCall {
    pub fn is_exec_containing(&self, needle: &str) -> bool {
        matches!(self, TransportCall::Exec(script) if script.contains(needle))
    }
}

type Responder = Box<dyn Fn(&TransportCall) -> CommandOutput>;

pub struct MockTransport {
    calls: RefCell<Vec<TransportCall>>,
    responder: Responder,
    ready: Cell<bool>,
}

impl MockTransport {
    /// Every call succeeds with empty output.
    pub fn new() -> Self {
        Self::with_responder(|_| CommandOutput::ok(""))
    }

    pub fn with_responder(responder: impl Fn(&TransportCall) -> CommandOutput + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
            ready: Cell::new(true),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: TransportCall) -> CommandOutput {
        let output = (self.responder)(&call);
        self.calls.borrow_mut().push(call);
        output
    }
}

impl RemoteTransport for MockTransport {
    fn backend(&self) -> Backend {
        Backend::Direct
    }

    fn target(&self) -> String {
        "mock-host".to_string()
    }

    fn exec(&self, command: &str) -> CommandOutput {
        self.record(TransportCall::Exec(command.to_string()))
    }

    fn copy(&self, local: &Path, remote_dir: &str, recursive: bool) -> CommandOutput {
        self.record(TransportCall::Copy {
            local: local.to_path_buf(),
            remote_dir: remote_dir.to_string(),
            recursive,
        })
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready.get() {
            Ok(())
        } else {
            Err(anyhow!(VmctlError::Unreachable {
                target: self.target(),
                detail: "mock transport is offline".to_string(),
            }))
        }
    }

    fn session_argv(&self, command: Option<&str>, _tty: bool) -> Vec<String> {
        let mut argv = vec!["mock-ssh".to_string()];
        argv.extend(command.map(str::to_string));
        argv
    }
}
