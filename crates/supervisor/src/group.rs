// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scoped collection of supervised children sharing one shutdown signal
//! and one cleanup barrier (§4.2).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinSet;

use crate::error::ProcessSetupError;
use crate::process::{self, FinishedProcess, OutputLine, OutputStream, RunOptions};

/// Every process the command spawns is registered here; on scope exit every
/// still-running child is sent shutdown, given `shutdown_timeout_sec` to
/// exit, then killed.
pub struct ConcurrencyGroup {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    shutdown_timeout: Duration,
    children: Mutex<JoinSet<()>>,
}

impl ConcurrencyGroup {
    /// `shutdown_timeout` is the scope-exit grace period (§4.2 default: 30s).
    pub fn new(shutdown_timeout: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self { shutdown_tx, shutdown_rx, shutdown_timeout, children: Mutex::new(JoinSet::new()) }
    }

    /// A clone of the level-triggered shutdown flag; a signal handler
    /// installed by the entry point sets it on the first interrupt.
    pub fn shutdown_event(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Run a child to completion and block the caller until it finishes.
    pub async fn run_process_to_completion(
        &self,
        command: &[String],
        options: RunOptions<'_>,
    ) -> Result<FinishedProcess, ProcessSetupError> {
        process::run(command, self.shutdown_rx.clone(), options).await
    }

    /// Spawn a child in the background and return a handle to it. The
    /// child is registered with the group so scope exit can reach it even
    /// if the caller drops the handle early.
    pub async fn run_background(
        &self,
        command: &[String],
        cwd: Option<PathBuf>,
        env: Vec<(String, String)>,
    ) -> Result<RunningProcess, ProcessSetupError> {
        let (program, args) = command.split_first().ok_or_else(|| ProcessSetupError {
            command: command.to_vec(),
            message: "empty command".to_string(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        if let Some(cwd) = &cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessSetupError {
            command: command.to_vec(),
            message: source.to_string(),
        })?;

        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = oneshot::channel();
        let pid = child.id();

        let mut shutdown = self.shutdown_rx.clone();
        let reader_tx = line_tx.clone();
        let handle = tokio::spawn(async move {
            let mut stdout_lines = BufReader::new(stdout).lines();
            let mut stderr_lines = BufReader::new(stderr).lines();
            let status = loop {
                tokio::select! {
                    biased;
                    line = stdout_lines.next_line() => {
                        if let Ok(Some(text)) = line {
                            let _ = reader_tx.send(OutputLine { stream: OutputStream::Stdout, text });
                        }
                    }
                    line = stderr_lines.next_line() => {
                        if let Ok(Some(text)) = line {
                            let _ = reader_tx.send(OutputLine { stream: OutputStream::Stderr, text });
                        }
                    }
                    status = child.wait() => break status.ok(),
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            let _ = child.start_kill();
                        }
                    }
                }
            };
            let _ = exit_tx.send(status.and_then(|s| s.code()));
        });

        let mut children = self.children.lock().await;
        children.spawn(async move {
            let _ = handle.await;
        });
        drop(children);

        Ok(RunningProcess { pid, lines: line_rx, exit: Some(exit_rx) })
    }

    /// Consume the group: signal shutdown, wait up to `shutdown_timeout` for
    /// every registered child, then abandon whatever is left.
    pub async fn join(self) {
        let _ = self.shutdown_tx.send(true);
        let mut children = self.children.into_inner();
        let _ = tokio::time::timeout(self.shutdown_timeout, async {
            while children.join_next().await.is_some() {}
        })
        .await;
        children.abort_all();
    }
}

/// A handle to a background child spawned via [`ConcurrencyGroup::run_background`].
pub struct RunningProcess {
    pid: Option<u32>,
    lines: mpsc::UnboundedReceiver<OutputLine>,
    exit: Option<oneshot::Receiver<Option<i32>>>,
}

impl RunningProcess {
    /// Drain whatever stdout lines have arrived so far without blocking.
    pub fn read_stdout(&mut self) -> Vec<String> {
        self.drain(OutputStream::Stdout)
    }

    /// Drain whatever stderr lines have arrived so far without blocking.
    pub fn read_stderr(&mut self) -> Vec<String> {
        self.drain(OutputStream::Stderr)
    }

    fn drain(&mut self, stream: OutputStream) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(line) = self.lines.try_recv() {
            if line.stream == stream {
                out.push(line.text);
            }
        }
        out
    }

    /// An async iterator of `(line, is_stdout)` pairs that terminates when
    /// the child exits.
    pub async fn next_output(&mut self) -> Option<(String, bool)> {
        self.lines.recv().await.map(|l| (l.text, l.stream == OutputStream::Stdout))
    }

    /// Block until the child exits (or `timeout` elapses), returning its
    /// exit code and every line seen along the way.
    pub async fn wait_and_read(&mut self, timeout: Option<Duration>) -> Option<i32> {
        let Some(exit) = self.exit.take() else { return None };
        let wait = async {
            while self.lines.recv().await.is_some() {}
            exit.await.ok().flatten()
        };
        match timeout {
            Some(t) => tokio::time::timeout(t, wait).await.ok().flatten(),
            None => wait.await,
        }
    }

    /// Non-blocking check: `Some(code)` once the child has exited.
    pub fn poll(&mut self) -> Option<Option<i32>> {
        let exit = self.exit.as_mut()?;
        match exit.try_recv() {
            Ok(code) => {
                self.exit = None;
                Some(code)
            }
            Err(_) => None,
        }
    }

    /// SIGTERM now, SIGKILL after `force_kill_seconds` if still alive.
    pub async fn terminate(&mut self, force_kill_seconds: u64) {
        let Some(pid) = self.pid else { return };
        #[cfg(unix)]
        {
            let pid = nix::unistd::Pid::from_raw(pid as i32);
            let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
        }
        tokio::time::sleep(Duration::from_secs(force_kill_seconds)).await;
        if self.poll().is_none() {
            #[cfg(unix)]
            {
                let pid = nix::unistd::Pid::from_raw(pid as i32);
                let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGKILL);
            }
        }
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
