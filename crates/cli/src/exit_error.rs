// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination in one place.

use std::fmt;

use mngr_core::MngrError;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
    pub help: Option<String>,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), help: None }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(help) = &self.help {
            write!(f, "\n{help}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExitError {}

/// Every recognized domain error maps to exit code 1 (§7: "a single
/// top-level handler converts every recognized domain error into a short
/// message and the configured nonzero exit code"); codes 10/11 are reserved
/// for the interactive-disconnect protocol and are produced directly by the
/// `connect` command, never by this conversion.
impl From<MngrError> for ExitError {
    fn from(err: MngrError) -> Self {
        let help = err.user_help_text().map(str::to_string);
        let mut exit_error = ExitError::new(1, err.to_string());
        exit_error.help = help;
        exit_error
    }
}
