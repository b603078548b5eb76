// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host advisory lock (§4.5: `lock_cooperatively()`), grounded on the
//! teacher's own daemon startup lock (`fs2::FileExt::try_lock_exclusive` over
//! a dedicated `.lock` file opened with `create(true).truncate(false)`, so
//! the lock is never dropped by truncating a file someone else already
//! holds).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StoreError;

/// Held for the duration of a mutation sequence; dropping it releases the
/// OS-level advisory lock. Readers that only need read access are not
/// required to hold one (§4.5).
pub struct HostLock {
    path: PathBuf,
    _file: File,
}

impl HostLock {
    /// Block until the exclusive lock on `lock_path` is acquired.
    pub fn acquire(lock_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| StoreError::Lock { path: lock_path.to_path_buf(), source: e })?;
        file.lock_exclusive().map_err(|e| StoreError::Lock { path: lock_path.to_path_buf(), source: e })?;
        Ok(Self { path: lock_path.to_path_buf(), _file: file })
    }

    /// Try to acquire without blocking; `Ok(None)` means another process
    /// currently holds it.
    pub fn try_acquire(lock_path: &Path) -> Result<Option<Self>, StoreError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| StoreError::Lock { path: lock_path.to_path_buf(), source: e })?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { path: lock_path.to_path_buf(), _file: file })),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(StoreError::Lock { path: lock_path.to_path_buf(), source: e }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
