// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backend-agnostic host/agent/provider contract (C6-C10), grounded on
//! the shape of the teacher's `AgentAdapter` trait: a `Send + Sync + 'static`
//! async trait with default-bodied convenience methods, plus small config
//! structs carried by value into each call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use mngr_core::{
    AgentId, AgentName, AgentRecord, AgentTypeName, CertifiedHostData, HostId, HostName, MngrError,
    SnapshotEntry, SnapshotId, SnapshotName, VolumeId,
};
use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;

/// The result of [`OnlineHostInterface::execute_command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub returncode: Option<i32>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.returncode == Some(0)
    }
}

/// What `get_host_resources` reports (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostResources {
    pub cpu: f64,
    pub memory_gb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus: Option<u32>,
}

/// How `create_agent_work_dir` populates a new agent's working tree from a
/// source path (§4.8). `Rsync`/`Clone`/`Worktree` operate relative to a git
/// checkout; `InPlace` and `FullCopy` do not require one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkDirCopyStrategy {
    Rsync,
    Clone,
    Worktree,
    InPlace,
    FullCopy,
}

/// Options for [`OnlineHostInterface::create_agent_work_dir`].
#[derive(Debug, Clone)]
pub struct WorkDirOptions {
    pub strategy: WorkDirCopyStrategy,
    pub include_git_dir: bool,
    pub uncommitted_changes_mode: mngr_core::UncommittedChangesMode,
}

/// Options for [`OnlineHostInterface::create_agent_state`].
#[derive(Debug, Clone)]
pub struct AgentCreateOptions {
    pub name: AgentName,
    pub agent_type: AgentTypeName,
    pub command: mngr_core::CommandString,
    pub cli_args: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    pub permissions: Vec<mngr_core::Permission>,
    pub is_start_on_boot: bool,
    pub initial_message: Option<String>,
    pub resume_message: Option<String>,
    pub message_delay_seconds: u64,
}

/// Context passed through `provision_agent` so per-agent-type hooks can read
/// the host's layout without the trait object depending on `mngr-store`
/// directly.
#[derive(Debug, Clone)]
pub struct ProvisionCtx {
    pub host_dir: PathBuf,
    pub work_dir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Read-only view every host exposes, online or offline (C7, §4.8).
#[async_trait]
pub trait HostInterface: Send + Sync + 'static {
    fn get_name(&self) -> &HostName;
    fn get_id(&self) -> HostId;
    async fn get_certified_data(&self) -> Result<CertifiedHostData, MngrError>;
    async fn get_state(&self) -> Result<mngr_core::HostState, MngrError>;
    /// Agents known to this host. The offline form reads straight from the
    /// persisted volume rather than asking a live multiplexer.
    async fn get_agents(&self) -> Result<Vec<AgentRecord>, MngrError>;
}

/// What an online host additionally offers (C7, §4.8).
#[async_trait]
pub trait OnlineHostInterface: HostInterface {
    async fn execute_command(
        &self,
        cmd: &str,
        user: Option<&str>,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, MngrError>;

    async fn create_agent_work_dir(
        &self,
        source_host: Option<&dyn OnlineHostInterface>,
        source_path: &Path,
        options: &WorkDirOptions,
    ) -> Result<PathBuf, MngrError>;

    /// Fails with [`MngrError::HostNameConflict`] if `options.name` is already
    /// in use on this host (§4.8).
    async fn create_agent_state(
        &self,
        work_dir: &Path,
        options: AgentCreateOptions,
    ) -> Result<Box<dyn AgentInterface>, MngrError>;

    async fn provision_agent(&self, agent: &dyn AgentInterface, ctx: &ProvisionCtx) -> Result<(), MngrError>;

    async fn start_agents(&self, ids: &[AgentId]) -> Result<(), MngrError>;
    async fn stop_agents(&self, ids: &[AgentId]) -> Result<(), MngrError>;
    async fn destroy_agent(&self, agent: &dyn AgentInterface) -> Result<(), MngrError>;

    /// Rehydrates the `AgentInterface` handle for an agent this host already
    /// knows about, so callers that only have an id (`mngr-fleet`'s
    /// send-message/rename/destroy paths) don't need to carry the handle
    /// `create_agent_state` returned around across process boundaries.
    /// Default body walks `get_agents` for the matching record; backends
    /// override it to go straight through their existing record-to-handle
    /// constructor.
    async fn get_agent(&self, id: &AgentId) -> Result<Box<dyn AgentInterface>, MngrError> {
        let _ = id;
        Err(MngrError::NotSupported { what: "get_agent" })
    }

    /// §4.9's step 2 only (the tmux-session half); the caller is responsible
    /// for step 1 (`mngr_store::AgentStore::rename`) having already succeeded.
    async fn rename_agent_session(&self, agent: &dyn AgentInterface, new_name: &AgentName) -> Result<(), MngrError>;

    async fn set_env_vars(&self, mapping: &BTreeMap<String, String>) -> Result<(), MngrError>;

    fn capabilities(&self) -> Capabilities;
}

/// One agent, C6 (§4.14).
#[async_trait]
pub trait AgentInterface: Send + Sync + 'static {
    fn id(&self) -> &AgentId;
    fn name(&self) -> &AgentName;

    /// Writes `text` to the agent's primary tmux window via send-keys,
    /// wrapped so it lands as a single user input with embedded newlines
    /// preserved; retried once on transient failure (§4.14).
    async fn send_message(&self, text: &str) -> Result<(), MngrError>;

    /// The shell string to run inside the agent's tmux window: agent-type
    /// base command plus resolution rules, `extra_args` appended, or
    /// `override_command` replacing the base entirely.
    fn assemble_command(
        &self,
        registry: &crate::agent_type::AgentTypeRegistry,
        extra_args: &[String],
        override_command: Option<&str>,
    ) -> Result<String, MngrError>;
}

/// Snapshot of one host, used by `list_hosts`/`get_host` callers that just
/// need identity plus provider-reported liveness without the full trait
/// object (kept thin so filters in `mngr-fleet` don't need `dyn` dispatch).
#[derive(Debug, Clone)]
pub struct HostSummary {
    pub id: HostId,
    pub name: HostName,
    pub state: mngr_core::HostState,
}

/// One provider backend, C8 (§4.10).
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    fn capabilities(&self) -> Capabilities;

    #[allow(clippy::too_many_arguments)]
    async fn create_host(
        &self,
        name: HostName,
        image: Option<mngr_core::ImageReference>,
        tags: BTreeMap<String, String>,
        build_args: BTreeMap<String, String>,
        start_args: BTreeMap<String, String>,
        known_hosts: Vec<String>,
        authorized_keys: Vec<String>,
        snapshot: Option<SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError>;

    async fn stop_host(&self, host: &HostId, create_snapshot: bool, timeout: Duration) -> Result<(), MngrError>;

    async fn start_host(
        &self,
        host: &HostId,
        snapshot_id: Option<&SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError>;

    async fn destroy_host(&self, host: &HostId) -> Result<(), MngrError>;

    async fn get_host(&self, host: &HostId) -> Result<Box<dyn HostInterface>, MngrError>;

    /// Like [`Self::get_host`], but for a caller (`mngr-fleet`) that needs to
    /// mutate an already-running host rather than merely inspect it —
    /// `start_host` exists to transition a stopped host online, not to hand
    /// back an interface to one that already is. Backends that reach this
    /// point in their lifecycle share one struct for both traits, so the
    /// override is a thin reconstruction rather than new logic.
    async fn get_online_host(&self, host: &HostId) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let _ = host;
        Err(MngrError::NotSupported { what: "get_online_host" })
    }

    /// Never raises a per-host error; a host that fails to enumerate is
    /// simply absent from the result (§4.10: "errors per host collected").
    async fn list_hosts(&self, include_destroyed: bool) -> Vec<HostSummary>;

    async fn get_host_resources(&self, host: &HostId) -> Result<HostResources, MngrError>;

    async fn create_snapshot(&self, host: &HostId, name: SnapshotName) -> Result<SnapshotEntry, MngrError> {
        let _ = (host, name);
        Err(MngrError::SnapshotsNotSupported)
    }

    async fn list_snapshots(&self, host: &HostId) -> Result<Vec<SnapshotEntry>, MngrError> {
        let _ = host;
        Err(MngrError::SnapshotsNotSupported)
    }

    async fn delete_snapshot(&self, host: &HostId, id: &SnapshotId) -> Result<(), MngrError> {
        let _ = (host, id);
        Err(MngrError::SnapshotsNotSupported)
    }

    async fn create_volume(&self, name: &str, size_gb: u32) -> Result<VolumeId, MngrError> {
        let _ = (name, size_gb);
        Err(MngrError::NotSupported { what: "volumes" })
    }

    async fn delete_volume(&self, id: &VolumeId) -> Result<(), MngrError> {
        let _ = id;
        Err(MngrError::NotSupported { what: "volumes" })
    }

    async fn set_tags(&self, host: &HostId, tags: BTreeMap<String, String>) -> Result<(), MngrError> {
        let _ = (host, tags);
        Err(MngrError::NotSupported { what: "tags" })
    }
}

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
