// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run one child process to a defined terminal state (§4.1).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{ProcessError, ProcessSetupError, ProcessTimeoutError};

/// The poll interval the supervisor drains output and checks shutdown /
/// timeout / exit conditions at (§4.1: "10 ms default").
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait after SIGTERM-equivalent before escalating to kill, and
/// how long to wait after kill before giving up.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Which stream a captured output line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A single captured line, tagged by stream, delivered in the exact order
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

/// The terminal result of running a child process to completion.
#[derive(Debug, Clone)]
pub struct FinishedProcess {
    pub command: Vec<String>,
    pub returncode: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub is_timed_out: bool,
    /// True when the caller already streamed output via `line_callback`, so
    /// an outer error handler should not print it again.
    pub was_output_already_streamed: bool,
}

impl FinishedProcess {
    /// Raise [`ProcessTimeoutError`] if timed out, else [`ProcessError`] if
    /// the returncode is nonzero, with the captured output attached.
    pub fn check(self) -> Result<Self, ProcessError> {
        if self.is_timed_out {
            return Err(ProcessError::TimedOut(ProcessTimeoutError {
                command: self.command,
                stdout: self.stdout,
                stderr: self.stderr,
                was_output_already_streamed: self.was_output_already_streamed,
            }));
        }
        if self.returncode != Some(0) {
            return Err(ProcessError::NonZeroExit {
                command: self.command,
                returncode: self.returncode,
                stdout: self.stdout,
                stderr: self.stderr,
                was_output_already_streamed: self.was_output_already_streamed,
            });
        }
        Ok(self)
    }
}

/// Options for [`run`].
#[derive(Default)]
pub struct RunOptions<'a> {
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub shutdown_timeout: Duration,
    pub line_callback: Option<Box<dyn FnMut(OutputLine) + Send + 'a>>,
}

impl<'a> RunOptions<'a> {
    pub fn new() -> Self {
        Self { shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT, ..Default::default() }
    }
}

/// Run `command` (program + args) to completion.
///
/// Stdin is bound to `/dev/null`. Every complete line of stdout/stderr is
/// delivered to `line_callback` in production order, tagged by stream;
/// incomplete trailing lines are delivered on exit. `shutdown` is polled on
/// [`DEFAULT_POLL_INTERVAL`]; when it fires (or `timeout` elapses first) the
/// child is sent SIGTERM, given `shutdown_timeout` to exit, then SIGKILL,
/// then two more seconds before the supervisor gives up on it.
pub async fn run<'a>(
    command: &[String],
    shutdown: watch::Receiver<bool>,
    mut options: RunOptions<'a>,
) -> Result<FinishedProcess, ProcessSetupError> {
    let (program, args) = command.split_first().ok_or_else(|| ProcessSetupError {
        command: command.to_vec(),
        message: "empty command".to_string(),
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &options.env {
        cmd.env(k, v);
    }

    let mut child = cmd.spawn().map_err(|source| ProcessSetupError {
        command: command.to_vec(),
        message: source.to_string(),
    })?;

    let stdout = child.stdout.take().expect("piped stdout");
    let stderr = child.stderr.take().expect("piped stderr");

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();

    let deadline = options.timeout.map(|t| Instant::now() + t);
    let mut is_timed_out = false;
    let returncode;

    // Three conditions are checked in this order on every poll: shutdown
    // requested, timeout reached, process exited (§4.1).
    loop {
        let sleep = tokio::time::sleep(DEFAULT_POLL_INTERVAL);
        tokio::select! {
            biased;
            line = stdout_lines.next_line() => {
                if let Ok(Some(line)) = line {
                    deliver(&mut options.line_callback, &mut stdout_buf, OutputStream::Stdout, line);
                }
            }
            line = stderr_lines.next_line() => {
                if let Ok(Some(line)) = line {
                    deliver(&mut options.line_callback, &mut stderr_buf, OutputStream::Stderr, line);
                }
            }
            status = child.wait() => {
                if *shutdown.borrow() {
                    returncode = escalate(&mut child, options.shutdown_timeout).await;
                } else if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        is_timed_out = true;
                        returncode = escalate(&mut child, options.shutdown_timeout).await;
                    } else {
                        returncode = status.ok().and_then(exit_code);
                    }
                } else {
                    returncode = status.ok().and_then(exit_code);
                }
                break;
            }
            _ = sleep => {
                if *shutdown.borrow() {
                    returncode = escalate(&mut child, options.shutdown_timeout).await;
                    break;
                }
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        is_timed_out = true;
                        returncode = escalate(&mut child, options.shutdown_timeout).await;
                        break;
                    }
                }
            }
        }
    }

    // Drain any remaining buffered output after exit.
    while let Ok(Some(line)) = stdout_lines.next_line().await {
        deliver(&mut options.line_callback, &mut stdout_buf, OutputStream::Stdout, line);
    }
    while let Ok(Some(line)) = stderr_lines.next_line().await {
        deliver(&mut options.line_callback, &mut stderr_buf, OutputStream::Stderr, line);
    }
    if !stdout_buf.is_empty() {
        deliver_incomplete(&mut options.line_callback, OutputStream::Stdout, &stdout_buf);
    }
    if !stderr_buf.is_empty() {
        deliver_incomplete(&mut options.line_callback, OutputStream::Stderr, &stderr_buf);
    }

    Ok(FinishedProcess {
        command: command.to_vec(),
        returncode,
        stdout: stdout_buf,
        stderr: stderr_buf,
        is_timed_out,
        was_output_already_streamed: true,
    })
}

fn deliver(
    callback: &mut Option<Box<dyn FnMut(OutputLine) + Send + '_>>,
    buf: &mut String,
    stream: OutputStream,
    line: String,
) {
    buf.push_str(&line);
    buf.push('\n');
    if let Some(cb) = callback {
        cb(OutputLine { stream, text: line });
    }
}

fn deliver_incomplete(
    callback: &mut Option<Box<dyn FnMut(OutputLine) + Send + '_>>,
    stream: OutputStream,
    text: &str,
) {
    if let Some(cb) = callback {
        cb(OutputLine { stream, text: text.to_string() });
    }
}

fn exit_code(status: std::process::ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.code().or_else(|| status.signal().map(|sig| -sig))
    }
    #[cfg(not(unix))]
    {
        status.code()
    }
}

/// SIGTERM, wait `shutdown_timeout`; if still alive, SIGKILL, wait two more
/// seconds; if still alive, give up and leave cleanup to the OS.
async fn escalate(child: &mut tokio::process::Child, shutdown_timeout: Duration) -> Option<i32> {
    send_terminate(child);
    if let Ok(Ok(status)) = tokio::time::timeout(shutdown_timeout, child.wait()).await {
        return exit_code(status);
    }
    let _ = child.kill().await;
    if let Ok(Ok(status)) = tokio::time::timeout(KILL_GRACE_PERIOD, child.wait()).await {
        return exit_code(status);
    }
    None
}

#[cfg(unix)]
fn send_terminate(child: &tokio::process::Child) {
    if let Some(pid) = child.id() {
        let pid = nix::unistd::Pid::from_raw(pid as i32);
        let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
    }
}

#[cfg(not(unix))]
fn send_terminate(_child: &tokio::process::Child) {}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
