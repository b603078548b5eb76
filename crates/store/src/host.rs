// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD over one host's durable state (§4.5).

use std::collections::BTreeMap;

use mngr_core::{AgentId, HostRecord};

use crate::atomic::{read_json, write_atomic_bytes, write_atomic_json};
use crate::env_file::{parse_env, render_env};
use crate::error::StoreError;
use crate::layout::HostPaths;
use crate::lock::HostLock;

/// One host's durable state, rooted at `<host_dir>`.
pub struct HostStore {
    paths: HostPaths,
}

impl HostStore {
    pub fn new(host_dir: impl Into<std::path::PathBuf>) -> Self {
        Self { paths: HostPaths::new(host_dir) }
    }

    pub fn paths(&self) -> &HostPaths {
        &self.paths
    }

    /// Create every directory the layout in §4.5 expects, so first-time
    /// writes never have to special-case a missing parent.
    pub fn ensure_dirs(&self) -> Result<(), StoreError> {
        for dir in [
            self.paths.commands_dir(),
            self.paths.logs_dir(),
            self.paths.agents_dir(),
            self.paths.signals_dir(),
            self.paths.activity_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir, e))?;
        }
        Ok(())
    }

    pub fn lock_cooperatively(&self) -> Result<HostLock, StoreError> {
        HostLock::acquire(&self.paths.lock_file())
    }

    pub fn read_record(&self) -> Result<Option<HostRecord>, StoreError> {
        read_json(&self.paths.data_json())
    }

    pub fn write_record(&self, record: &HostRecord) -> Result<(), StoreError> {
        write_atomic_json(&self.paths.data_json(), record)
    }

    pub fn read_tags(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(read_json(&self.paths.tags_json())?.unwrap_or_default())
    }

    pub fn write_tags(&self, tags: &BTreeMap<String, String>) -> Result<(), StoreError> {
        write_atomic_json(&self.paths.tags_json(), tags)
    }

    pub fn read_env(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.paths.env_file();
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(parse_env(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    pub fn write_env(&self, env: &BTreeMap<String, String>) -> Result<(), StoreError> {
        write_atomic_bytes(&self.paths.env_file(), render_env(env).as_bytes())
    }

    /// Every agent id with a directory under `agents/`, in no particular
    /// order; a malformed entry is skipped rather than failing the whole
    /// listing (§4.5: "tolerates missing fields by degrading").
    pub fn list_agent_ids(&self) -> Result<Vec<AgentId>, StoreError> {
        let dir = self.paths.agents_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(self.paths.agents_dir(), e))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(AgentId::from_string(name));
                }
            }
        }
        Ok(ids)
    }

    /// `activity/ssh`'s mtime, the authoritative SSH activity timestamp.
    pub fn ssh_activity_mtime_ms(&self) -> Result<Option<u64>, StoreError> {
        crate::activity::mtime_ms(&self.paths.ssh_activity_file())
    }

    /// Write `activity/ssh` (§6 wire protocol #2): `{"time", "ssh_pid"}`,
    /// with the file's own mtime carrying the authoritative timestamp.
    pub fn write_ssh_activity(&self, time_ms: u64, ssh_pid: u32) -> Result<(), StoreError> {
        let body = serde_json::json!({ "time": time_ms, "ssh_pid": ssh_pid });
        write_atomic_json(&self.paths.ssh_activity_file(), &body)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
