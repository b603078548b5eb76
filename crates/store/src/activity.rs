// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity files: empty markers whose mtime IS the activity time (§4.5,
//! §8: "the mtime of any activity file never decreases under the watcher's
//! own writes").

use std::path::Path;

use crate::error::StoreError;

/// The mtime of `path` in milliseconds since the epoch, or `None` if the
/// file does not exist.
pub fn mtime_ms(path: &Path) -> Result<Option<u64>, StoreError> {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta.modified().map_err(|e| StoreError::io(path, e))?;
            let ms = modified
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            Ok(Some(ms))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Touch `path`: create it if absent, and otherwise just advance its mtime.
/// Content is irrelevant (the file is always empty); only the mtime that a
/// write produces carries meaning.
pub fn touch(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Every activity source name with a file under `dir`, in no particular
/// order.
pub fn list_sources(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };
    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        if let Some(name) = entry.file_name().to_str() {
            sources.push(name.to_string());
        }
    }
    Ok(sources)
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
