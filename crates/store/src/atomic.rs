// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-temp-then-rename for every durable record (§4.5: "a reader never
//! observes a partially-written data.json; either the previous version or
//! the new").

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

fn tmp_sibling(path: &Path) -> PathBuf {
    let file_name = path.file_name().unwrap_or_default();
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}

/// Write `bytes` to `path` atomically: write a `.tmp` sibling in the same
/// directory, then rename it over `path`. `rename` within one filesystem is
/// atomic, so readers only ever see the previous file or the new one.
pub fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let tmp_path = tmp_sibling(path);
    std::fs::write(&tmp_path, bytes).map_err(|e| StoreError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

pub fn write_atomic_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    bytes.push(b'\n');
    write_atomic_bytes(path, &bytes)
}

/// Read and parse `path`, returning `None` if it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::json(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Same as [`read_json`], but a record that fails to parse is treated as
/// absent rather than an error (§4.5: "readers ... report a skip, never a
/// crash"). Intended for listing/fan-out paths that must degrade gracefully
/// rather than abort on one corrupt file.
pub fn read_json_lenient<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match read_json(path) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable record");
            None
        }
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
