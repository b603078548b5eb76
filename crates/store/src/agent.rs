// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CRUD over one agent's durable state, nested under its host (§4.5).
//!
//! The three marker booleans `derive_agent_state` consumes (waiting/done/
//! replaced) are not read here: what counts as "waiting" or "done" is
//! agent-type specific (an agent type can define its own reported-file
//! convention), so translating the raw reported fields below into those
//! booleans is `mngr-provider`'s job, not this crate's.

use std::collections::BTreeMap;

use mngr_core::{AgentId, AgentRecord};

use crate::atomic::{read_json, write_atomic_bytes, write_atomic_json};
use crate::env_file::{parse_env, render_env};
use crate::error::StoreError;
use crate::layout::HostPaths;

/// One agent's durable state, nested under its host's [`HostPaths`].
pub struct AgentStore {
    paths: HostPaths,
    id: AgentId,
}

impl AgentStore {
    pub fn new(paths: HostPaths, id: AgentId) -> Self {
        Self { paths, id }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn read_record(&self) -> Result<Option<AgentRecord>, StoreError> {
        read_json(&self.paths.agent_data_json(&self.id))
    }

    pub fn write_record(&self, record: &AgentRecord) -> Result<(), StoreError> {
        write_atomic_json(&self.paths.agent_data_json(&self.id), record)
    }

    /// Step 1 of rename (§4.9): atomically write the new name into
    /// `data.json`. The multiplexer session rename is a separate step the
    /// caller performs through the host interface once this succeeds.
    pub fn rename(&self, new_name: mngr_core::AgentName) -> Result<Option<AgentRecord>, StoreError> {
        let Some(mut record) = self.read_record()? else { return Ok(None) };
        record.name = new_name;
        self.write_record(&record)?;
        Ok(Some(record))
    }

    pub fn read_env(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.paths.agent_env_file(&self.id);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(parse_env(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    pub fn write_env(&self, env: &BTreeMap<String, String>) -> Result<(), StoreError> {
        write_atomic_bytes(&self.paths.agent_env_file(&self.id), render_env(env).as_bytes())
    }

    /// Record activity of `source` at the current mtime.
    pub fn touch_activity(&self, source: &str) -> Result<(), StoreError> {
        crate::activity::touch(&self.paths.agent_activity_file(&self.id, source))
    }

    pub fn activity_mtime_ms(&self, source: &str) -> Result<Option<u64>, StoreError> {
        crate::activity::mtime_ms(&self.paths.agent_activity_file(&self.id, source))
    }

    pub fn list_activity_sources(&self) -> Result<Vec<String>, StoreError> {
        crate::activity::list_sources(&self.paths.agent_activity_dir(&self.id))
    }

    /// Every activity mtime this agent has recorded, for idle computation
    /// (§4.13, `mngr_core::lifecycle::compute_idle_seconds`).
    pub fn activity_mtimes_ms(&self) -> Result<Vec<u64>, StoreError> {
        let mut mtimes = Vec::new();
        for source in self.list_activity_sources()? {
            if let Some(ms) = self.activity_mtime_ms(&source)? {
                mtimes.push(ms);
            }
        }
        Ok(mtimes)
    }

    fn read_reported_text(&self, path: std::path::PathBuf) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    pub fn reported_url(&self) -> Result<Option<String>, StoreError> {
        self.read_reported_text(self.paths.agent_reported_url(&self.id)).map(|v| v.map(trim_one_line))
    }

    pub fn reported_start_time(&self) -> Result<Option<String>, StoreError> {
        self.read_reported_text(self.paths.agent_reported_start_time(&self.id)).map(|v| v.map(trim_one_line))
    }

    pub fn reported_status_markdown(&self) -> Result<Option<String>, StoreError> {
        self.read_reported_text(self.paths.agent_reported_status_md(&self.id))
    }

    pub fn reported_status_html(&self) -> Result<Option<String>, StoreError> {
        self.read_reported_text(self.paths.agent_reported_status_html(&self.id))
    }
}

fn trim_one_line(text: String) -> String {
    text.trim_end_matches(['\n', '\r']).to_string()
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
