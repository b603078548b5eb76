// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path helpers over the host directory layout (§4.5). Nothing here touches
//! the filesystem; it only computes paths, so it is trivial to test and
//! trivial to reuse from both the manager side and the on-host side.

use std::path::{Path, PathBuf};

use mngr_core::AgentId;

/// Every path under one host's state directory.
#[derive(Debug, Clone)]
pub struct HostPaths {
    root: PathBuf,
}

impl HostPaths {
    pub fn new(host_dir: impl Into<PathBuf>) -> Self {
        Self { root: host_dir.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_json(&self) -> PathBuf {
        self.root.join("data.json")
    }

    pub fn tags_json(&self) -> PathBuf {
        self.root.join("tags.json")
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join("env")
    }

    pub fn commands_dir(&self) -> PathBuf {
        self.root.join("commands")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.root.join("agents")
    }

    pub fn agent_dir(&self, id: &AgentId) -> PathBuf {
        self.agents_dir().join(id.to_string())
    }

    pub fn agent_data_json(&self, id: &AgentId) -> PathBuf {
        self.agent_dir(id).join("data.json")
    }

    pub fn agent_env_file(&self, id: &AgentId) -> PathBuf {
        self.agent_dir(id).join("env")
    }

    pub fn agent_activity_dir(&self, id: &AgentId) -> PathBuf {
        self.agent_dir(id).join("activity")
    }

    pub fn agent_activity_file(&self, id: &AgentId, source: &str) -> PathBuf {
        self.agent_activity_dir(id).join(source)
    }

    pub fn agent_reported_dir(&self, id: &AgentId) -> PathBuf {
        self.agent_dir(id).join("reported")
    }

    pub fn agent_reported_url(&self, id: &AgentId) -> PathBuf {
        self.agent_reported_dir(id).join("url")
    }

    pub fn agent_reported_start_time(&self, id: &AgentId) -> PathBuf {
        self.agent_reported_dir(id).join("start_time")
    }

    pub fn agent_reported_status_md(&self, id: &AgentId) -> PathBuf {
        self.agent_reported_dir(id).join("status.md")
    }

    pub fn agent_reported_status_html(&self, id: &AgentId) -> PathBuf {
        self.agent_reported_dir(id).join("status.html")
    }

    pub fn agent_reported_plugin_dir(&self, id: &AgentId, plugin: &str) -> PathBuf {
        self.agent_reported_dir(id).join("plugin").join(plugin)
    }

    pub fn agent_plugin_json(&self, id: &AgentId, plugin: &str) -> PathBuf {
        self.agent_dir(id).join("plugin").join(format!("{plugin}.json"))
    }

    pub fn signals_dir(&self) -> PathBuf {
        self.root.join("signals")
    }

    pub fn signal_file(&self, session: &str) -> PathBuf {
        self.signals_dir().join(session)
    }

    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    pub fn ssh_activity_file(&self) -> PathBuf {
        self.activity_dir().join("ssh")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".lock")
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
