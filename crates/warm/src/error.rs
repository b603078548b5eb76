// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarmError {
    #[error("failed to connect to warm socket {path}: {source}")]
    Connect { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to pass file descriptors over {path}: {source}")]
    FdPassing { path: PathBuf, #[source] source: nix::Error },

    #[error("warm server closed the connection before sending an exit code")]
    Truncated,

    #[error("payload was not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to fork warm successor: {0}")]
    Fork(#[source] nix::Error),
}

impl WarmError {
    /// True when the failure means "nothing is listening here", the signal
    /// to fall back to the cold path rather than log a real error.
    pub fn is_connect_refused(&self) -> bool {
        match self {
            WarmError::Connect { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
            ),
            _ => false,
        }
    }
}
