//! Remote command execution inside running containers.
//!
//! Commands run through the engine's exec primitives as `bash -c <cmd>`.
//! The default entry point runs unprivileged and retries exactly once with
//! an elevated user when the output carries the permission-denied marker;
//! explicit requests bypass that policy entirely.

use std::io::Read;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dockhand_common::constants;
use dockhand_common::error::{DockhandError, Result};
use dockhand_engine::{EngineClient, ExecOptions};

/// One remote execution request.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Target container name.
    pub container: String,
    /// Shell command, wrapped as `bash -c <command>`.
    pub command: String,
    /// Run with the effective user elevated to root.
    pub privileged: bool,
    /// Return immediately without capturing output.
    pub detached: bool,
    /// Deadline for draining the output stream; `None` blocks until the
    /// stream ends.
    pub deadline: Option<Duration>,
}

impl ExecRequest {
    /// Builds an attached, unprivileged request without a deadline.
    #[must_use]
    pub fn new(container: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            command: command.into(),
            privileged: false,
            detached: false,
            deadline: None,
        }
    }
}

/// Executes shell commands inside running containers.
pub struct RemoteExec {
    engine: Arc<dyn EngineClient>,
}

impl RemoteExec {
    /// Creates an executor over the given engine client.
    #[must_use]
    pub fn new(engine: Arc<dyn EngineClient>) -> Self {
        Self { engine }
    }

    /// Runs a command unprivileged, escalating once if the output contains
    /// the permission-denied marker. Never escalates more than once.
    ///
    /// # Errors
    ///
    /// `ExecutionFailed` on any engine or stream failure,
    /// `ExecutionTimedOut` when the deadline elapses.
    pub fn run(&self, container: &str, command: &str, deadline: Option<Duration>) -> Result<String> {
        let mut request = ExecRequest {
            deadline,
            ..ExecRequest::new(container, command)
        };
        let output = self.run_as(&request)?;
        if output.contains(constants::PERMISSION_DENIED_MARKER) {
            tracing::warn!(container = %container, command = %command, "retrying exec in privileged mode");
            request.privileged = true;
            return self.run_as(&request);
        }
        Ok(output)
    }

    /// Runs a command exactly as requested, with no escalation policy.
    ///
    /// Detached requests return an empty string immediately; attached ones
    /// block until the combined output stream is drained or the deadline
    /// elapses. No partial output is returned on failure.
    ///
    /// # Errors
    ///
    /// `ExecutionFailed` on any engine or stream failure,
    /// `ExecutionTimedOut` when the deadline elapses.
    pub fn run_as(&self, request: &ExecRequest) -> Result<String> {
        let cmd = vec![
            "bash".to_owned(),
            "-c".to_owned(),
            request.command.clone(),
        ];
        let opts = ExecOptions {
            detach: request.detached,
            attach_stdout: true,
            attach_stderr: true,
            user: request.privileged.then(|| "root".to_owned()),
        };

        let exec_id = self
            .engine
            .exec_create(&request.container, &cmd, &opts)
            .map_err(|e| exec_failed(request, &e.to_string()))?;
        let stream = self
            .engine
            .exec_start(&exec_id)
            .map_err(|e| exec_failed(request, &e.to_string()))?;

        if request.detached {
            tracing::debug!(container = %request.container, exec = %exec_id.as_str(), "detached exec started");
            return Ok(String::new());
        }
        let output = drain(stream, request)?;
        tracing::debug!(container = %request.container, bytes = output.len(), "exec output drained");
        Ok(output)
    }
}

fn drain(mut stream: Box<dyn Read + Send>, request: &ExecRequest) -> Result<String> {
    let Some(deadline) = request.deadline else {
        let mut output = String::new();
        let _ = stream
            .read_to_string(&mut output)
            .map_err(|e| exec_failed(request, &e.to_string()))?;
        return Ok(output);
    };

    // Drain on a helper thread so the deadline applies to the whole read.
    // On timeout the reader is abandoned; its stream closes when the
    // engine tears the exec down.
    let (sender, receiver) = mpsc::channel();
    let _reader = thread::spawn(move || {
        let mut output = String::new();
        let result = stream.read_to_string(&mut output).map(|_| output);
        let _ = sender.send(result);
    });

    match receiver.recv_timeout(deadline) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(exec_failed(request, &e.to_string())),
        Err(_) => Err(DockhandError::ExecutionTimedOut {
            container: request.container.clone(),
            command: request.command.clone(),
        }),
    }
}

fn exec_failed(request: &ExecRequest, message: &str) -> DockhandError {
    DockhandError::ExecutionFailed {
        container: request.container.clone(),
        command: request.command.clone(),
        message: message.to_owned(),
    }
}
