// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-host signal file (§6 wire protocol #3): a single-word file written
//! by the multiplexer's key binding on disconnect, read and unlinked exactly
//! once by the connect wrapper. Exit codes 10 and 11 carry the same two
//! values back up to the caller (§4.11).

use std::path::Path;

use crate::error::StoreError;

/// What the caller asked for on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Destroy,
    Stop,
}

impl Signal {
    fn as_word(self) -> &'static str {
        match self {
            Signal::Destroy => "destroy",
            Signal::Stop => "stop",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word.trim() {
            "destroy" => Some(Signal::Destroy),
            "stop" => Some(Signal::Stop),
            _ => None,
        }
    }
}

/// Write the signal file at `path`, overwriting anything already there.
pub fn write_signal(path: &Path, signal: Signal) -> Result<(), StoreError> {
    crate::atomic::write_atomic_bytes(path, signal.as_word().as_bytes())
}

/// Read the signal file at `path` and unlink it so a later connect never
/// observes a stale value. `Ok(None)` covers both "no file" and "unrecognized
/// content": a corrupt signal file degrades to "no signal" rather than an
/// error (§4.5's "readers report a skip, never a crash").
pub fn read_signal(path: &Path) -> Result<Option<Signal>, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to unlink consumed signal file");
    }
    Ok(Signal::from_word(&text))
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
