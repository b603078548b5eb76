// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// The child could not be launched at all (missing binary, permission
/// denied). No retry is attempted here; retry is the caller's decision.
#[derive(Debug, Error)]
#[error("failed to launch {command:?}: {message}")]
pub struct ProcessSetupError {
    pub command: Vec<String>,
    pub message: String,
}

/// The child ran to completion but was interrupted by its own timeout
/// before exiting.
#[derive(Debug, Error)]
#[error("command {command:?} timed out")]
pub struct ProcessTimeoutError {
    pub command: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub was_output_already_streamed: bool,
}

/// [`crate::process::FinishedProcess::check`]'s error: either the process
/// timed out or it exited with a nonzero code.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    TimedOut(#[from] ProcessTimeoutError),

    #[error("command {command:?} exited with code {returncode:?}")]
    NonZeroExit {
        command: Vec<String>,
        returncode: Option<i32>,
        stdout: String,
        stderr: String,
        was_output_already_streamed: bool,
    },
}
