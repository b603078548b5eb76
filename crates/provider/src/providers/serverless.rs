// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The serverless backend: every host is an ephemeral sandbox created
//! through a provider's HTTP control plane (reached with `reqwest`), the
//! only backend whose hosts natively snapshot (§4.8's `supports_snapshots`
//! capability). Bookkeeping follows the same local `mngr-store` layout
//! `local`/`container` use; only command execution and host lifecycle go
//! over HTTP instead of a local process or a pod exec.
//!
//! Grounding here is thin — the filtered original-source tree keeps only
//! `modal/log_utils.py` (non-test) for this backend — so the request shapes
//! below follow a plain REST convention rather than a specific SDK.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use mngr_core::{
    AgentId, AgentName, AgentRecord, CertifiedHostData, Clock, HostId, HostName, HostRecord, HostState,
    MngrError, SnapshotId, SystemClock,
};
use mngr_store::{AgentStore, HostPaths, HostStore};
use serde::{Deserialize, Serialize};

use crate::agent::{CommandExecutor, TmuxAgentInterface};
use crate::capability::Capabilities;
use crate::contract::{
    AgentCreateOptions, AgentInterface, CommandResult, HostInterface, HostResources, HostSummary,
    OnlineHostInterface, Provider, ProvisionCtx, WorkDirOptions,
};

const TMUX_PREFIX: &str = "mngr-";

#[derive(Serialize)]
struct ExecRequest<'a> {
    sandbox_id: &'a str,
    command: &'a str,
}

#[derive(Deserialize)]
struct ExecResponse {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

#[derive(Serialize)]
struct CreateSandboxRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct CreateSandboxResponse {
    sandbox_id: String,
}

#[derive(Serialize)]
struct CreateSnapshotRequest<'a> {
    sandbox_id: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct CreateSnapshotResponse {
    snapshot_id: String,
}

struct SandboxExecutor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sandbox_id: String,
}

impl SandboxExecutor {
    async fn exec(&self, command: &str) -> Result<CommandResult, MngrError> {
        let response = self
            .client
            .post(format!("{}/sandboxes/exec", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ExecRequest { sandbox_id: &self.sandbox_id, command })
            .send()
            .await
            .map_err(|e| MngrError::Provider { message: format!("sandbox exec request failed: {e}") })?
            .error_for_status()
            .map_err(|e| MngrError::Provider { message: format!("sandbox exec failed: {e}") })?
            .json::<ExecResponse>()
            .await
            .map_err(|e| MngrError::Provider { message: format!("malformed exec response: {e}") })?;
        Ok(CommandResult { stdout: response.stdout, stderr: response.stderr, returncode: response.exit_code })
    }
}

#[async_trait]
impl CommandExecutor for SandboxExecutor {
    async fn run(&self, command: &str) -> Result<bool, MngrError> {
        Ok(self.exec(command).await?.success())
    }
}

pub struct ServerlessHost {
    id: HostId,
    name: HostName,
    store: HostStore,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sandbox_id: String,
}

impl ServerlessHost {
    fn agent_store(&self, id: AgentId) -> AgentStore {
        AgentStore::new(HostPaths::new(self.store.paths().root()), id)
    }

    fn executor(&self) -> SandboxExecutor {
        SandboxExecutor {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            sandbox_id: self.sandbox_id.clone(),
        }
    }

    fn tmux_agent(&self, record: &AgentRecord) -> TmuxAgentInterface<SandboxExecutor> {
        TmuxAgentInterface::new(record.id, record.name.clone(), TMUX_PREFIX.to_string(), record.agent_type.clone(), self.executor())
    }
}

#[async_trait]
impl HostInterface for ServerlessHost {
    fn get_name(&self) -> &HostName {
        &self.name
    }

    fn get_id(&self) -> HostId {
        self.id
    }

    async fn get_certified_data(&self) -> Result<CertifiedHostData, MngrError> {
        self.store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .map(|r| r.certified)
            .ok_or_else(|| MngrError::HostNotFound { name: self.name.to_string() })
    }

    async fn get_state(&self) -> Result<HostState, MngrError> {
        let record = self.store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })?;
        let Some(record) = record else { return Ok(HostState::Destroyed) };
        let alive = self.executor().exec("true").await.map(|r| r.success()).unwrap_or(false);
        Ok(mngr_core::lifecycle::derive_host_state(mngr_core::lifecycle::HostStateSignals {
            gone_from_provider: !alive && record.certified.stop_reason == mngr_core::StopReason::None,
            stop_reason: record.certified.stop_reason,
            provider_building: false,
            ssh_accepting: alive,
            data_json_readable: true,
        }))
    }

    async fn get_agents(&self) -> Result<Vec<AgentRecord>, MngrError> {
        let ids = self.store.list_agent_ids().map_err(|e| MngrError::Provider { message: e.to_string() })?;
        let mut agents = Vec::new();
        for id in ids {
            if let Ok(Some(record)) = self.agent_store(id).read_record() {
                agents.push(record);
            }
        }
        Ok(agents)
    }
}

#[async_trait]
impl OnlineHostInterface for ServerlessHost {
    async fn execute_command(
        &self,
        cmd: &str,
        _user: Option<&str>,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, MngrError> {
        let full = match cwd {
            Some(cwd) => format!("cd '{}' && {cmd}", cwd.display()),
            None => cmd.to_string(),
        };
        let run = self.executor().exec(&full);
        match timeout {
            Some(t) => tokio::time::timeout(t, run)
                .await
                .map_err(|_| MngrError::Provider { message: format!("command timed out: {cmd}") })?,
            None => run.await,
        }
    }

    async fn create_agent_work_dir(
        &self,
        _source_host: Option<&dyn OnlineHostInterface>,
        source_path: &Path,
        options: &WorkDirOptions,
    ) -> Result<PathBuf, MngrError> {
        let dest = PathBuf::from(format!("/work/wd-{}", nanoid::nanoid!(12)));
        let exclude = if options.include_git_dir { "" } else { "--exclude=.git " };
        let cmd = format!("mkdir -p '{}' && rsync -a {exclude}'{}/' '{}'", dest.display(), source_path.display(), dest.display());
        self.executor().exec(&cmd).await?.success().then_some(()).ok_or_else(|| MngrError::Provider {
            message: "failed to populate sandbox work dir".to_string(),
        })?;
        Ok(dest)
    }

    async fn create_agent_state(&self, work_dir: &Path, options: AgentCreateOptions) -> Result<Box<dyn AgentInterface>, MngrError> {
        for existing in self.get_agents().await? {
            if existing.name == options.name {
                return Err(MngrError::HostNameConflict { name: options.name.to_string() });
            }
        }
        let id = AgentId::new();
        let record = AgentRecord {
            id,
            name: options.name,
            agent_type: options.agent_type,
            work_dir: work_dir.to_path_buf(),
            create_time: SystemClock.epoch_ms(),
            host_id: self.id,
            command: options.command,
            cli_args: options.cli_args,
            env_vars: options.env_vars,
            permissions: options.permissions,
            is_start_on_boot: options.is_start_on_boot,
            initial_message: options.initial_message,
            resume_message: options.resume_message,
            message_delay_seconds: options.message_delay_seconds,
            reported: mngr_core::AgentReported::default(),
            plugin_certified: BTreeMap::new(),
        };
        self.agent_store(id).write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(self.tmux_agent(&record)))
    }

    async fn provision_agent(&self, _agent: &dyn AgentInterface, ctx: &ProvisionCtx) -> Result<(), MngrError> {
        self.executor().exec(&format!("mkdir -p '{}'", ctx.work_dir.display())).await?.success().then_some(()).ok_or_else(|| {
            MngrError::Provider { message: "failed to create work dir in sandbox".to_string() }
        })
    }

    async fn start_agents(&self, ids: &[AgentId]) -> Result<(), MngrError> {
        for id in ids {
            let Some(record) = self.agent_store(*id).read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
                continue;
            };
            let session = format!("{TMUX_PREFIX}{}", record.name.as_str());
            let has_session = self.executor().exec(&format!("tmux has-session -t '{session}'")).await?.success();
            if has_session {
                continue;
            }
            let mut parts = vec![record.command.as_str().to_string()];
            parts.extend(record.cli_args.iter().cloned());
            let command = parts.join(" ").replace('\'', "'\\''");
            let cmd = format!("tmux new-session -d -s '{session}' -c '{}' '{command}'", record.work_dir.display());
            self.executor().exec(&cmd).await?.success().then_some(()).ok_or_else(|| MngrError::Provider {
                message: format!("failed to start tmux session {session}"),
            })?;
        }
        Ok(())
    }

    async fn stop_agents(&self, ids: &[AgentId]) -> Result<(), MngrError> {
        for id in ids {
            let Some(record) = self.agent_store(*id).read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
                continue;
            };
            let session = format!("{TMUX_PREFIX}{}", record.name.as_str());
            let _ = self.executor().exec(&format!("tmux kill-session -t '{session}'")).await;
        }
        Ok(())
    }

    async fn destroy_agent(&self, agent: &dyn AgentInterface) -> Result<(), MngrError> {
        let session = format!("{TMUX_PREFIX}{}", agent.name().as_str());
        let _ = self.executor().exec(&format!("tmux kill-session -t '{session}'")).await;
        let dir = self.store.paths().agent_dir(agent.id());
        tokio::fs::remove_dir_all(&dir).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(())
            } else {
                Err(MngrError::Provider { message: e.to_string() })
            }
        })
    }

    async fn get_agent(&self, id: &AgentId) -> Result<Box<dyn AgentInterface>, MngrError> {
        let record = self
            .agent_store(*id)
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::AgentNotFound { name: id.to_string() })?;
        Ok(Box::new(self.tmux_agent(&record)))
    }

    async fn rename_agent_session(&self, agent: &dyn AgentInterface, new_name: &AgentName) -> Result<(), MngrError> {
        let old_session = format!("{TMUX_PREFIX}{}", agent.name().as_str());
        let new_session = format!("{TMUX_PREFIX}{}", new_name.as_str());
        let has_old = self.executor().exec(&format!("tmux has-session -t '{old_session}'")).await?.success();
        if !has_old {
            return Ok(());
        }
        self.executor()
            .exec(&format!("tmux rename-session -t '{old_session}' '{new_session}'"))
            .await?
            .success()
            .then_some(())
            .ok_or_else(|| MngrError::Provider { message: format!("failed to rename session {old_session}") })
    }

    async fn set_env_vars(&self, mapping: &BTreeMap<String, String>) -> Result<(), MngrError> {
        self.store.write_env(mapping).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::serverless()
    }
}

/// Configuration for the HTTP control plane a serverless provider instance
/// talks to.
pub struct ServerlessProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

pub struct ServerlessProvider {
    instance_name: mngr_core::ProviderInstanceName,
    root: PathBuf,
    client: reqwest::Client,
    config: ServerlessProviderConfig,
}

impl ServerlessProvider {
    pub fn new(instance_name: mngr_core::ProviderInstanceName, root: impl Into<PathBuf>, config: ServerlessProviderConfig) -> Self {
        Self { instance_name, root: root.into(), client: reqwest::Client::new(), config }
    }

    fn host_dir(&self, id: &HostId) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[async_trait]
impl Provider for ServerlessProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::serverless()
    }

    async fn create_host(
        &self,
        name: HostName,
        image: Option<mngr_core::ImageReference>,
        tags: BTreeMap<String, String>,
        _build_args: BTreeMap<String, String>,
        _start_args: BTreeMap<String, String>,
        _known_hosts: Vec<String>,
        _authorized_keys: Vec<String>,
        snapshot: Option<SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let id = HostId::derive(self.instance_name.as_str(), name.as_str());
        let dir = self.host_dir(&id);
        let store = HostStore::new(&dir);
        store.ensure_dirs().map_err(|e| MngrError::Provider { message: e.to_string() })?;
        if store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })?.is_some() {
            return Err(MngrError::HostNameConflict { name: name.to_string() });
        }

        let image_ref = snapshot.as_ref().map(|s| s.as_str().to_string()).or_else(|| image.as_ref().map(|i| i.as_str().to_string())).unwrap_or_else(|| "ubuntu:24.04".to_string());
        let response = self
            .client
            .post(format!("{}/sandboxes", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&CreateSandboxRequest { image: &image_ref })
            .send()
            .await
            .map_err(|e| MngrError::Provider { message: format!("sandbox create request failed: {e}") })?
            .error_for_status()
            .map_err(|e| MngrError::Provider { message: format!("sandbox create failed: {e}") })?
            .json::<CreateSandboxResponse>()
            .await
            .map_err(|e| MngrError::Provider { message: format!("malformed create response: {e}") })?;

        let now = SystemClock.epoch_ms();
        let mut certified = CertifiedHostData::new(id, name.clone(), now);
        certified.user_tags = tags;
        certified.image = image;
        let record = HostRecord {
            certified,
            ssh_host: None,
            ssh_port: None,
            ssh_host_public_key: None,
            container_id: Some(response.sandbox_id.clone()),
            config: None,
        };
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(ServerlessHost {
            id,
            name,
            store,
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            api_key: self.config.api_key.clone(),
            sandbox_id: response.sandbox_id,
        }))
    }

    async fn stop_host(&self, host: &HostId, create_snapshot: bool, _timeout: Duration) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        let Some(sandbox_id) = record.container_id.clone() else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        if create_snapshot {
            let response = self
                .client
                .post(format!("{}/sandboxes/snapshot", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&CreateSnapshotRequest { sandbox_id: &sandbox_id, name: "stop-snapshot" })
                .send()
                .await
                .map_err(|e| MngrError::Provider { message: format!("snapshot request failed: {e}") })?
                .json::<CreateSnapshotResponse>()
                .await
                .map_err(|e| MngrError::Provider { message: format!("malformed snapshot response: {e}") })?;
            record.certified.push_snapshot(
                mngr_core::SnapshotEntry {
                    id: SnapshotId::new(response.snapshot_id),
                    name: mngr_core::names::SnapshotName::new("stop-snapshot").expect("literal is a valid slug"),
                    created_at: SystemClock.epoch_ms(),
                },
                SystemClock.epoch_ms(),
            );
        }
        let _ = self
            .client
            .delete(format!("{}/sandboxes/{sandbox_id}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;
        record.certified.stop_reason = mngr_core::StopReason::Stopped;
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn start_host(&self, host: &HostId, snapshot_id: Option<&SnapshotId>) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        if record.certified.stop_reason == mngr_core::StopReason::None {
            return Err(MngrError::HostNotStopped { name: record.certified.host_name.to_string() });
        }
        let image_ref = snapshot_id
            .map(|s| s.as_str().to_string())
            .or_else(|| record.certified.snapshots.last().map(|s| s.id.as_str().to_string()))
            .or_else(|| record.certified.image.as_ref().map(|i| i.as_str().to_string()))
            .unwrap_or_else(|| "ubuntu:24.04".to_string());
        let response = self
            .client
            .post(format!("{}/sandboxes", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&CreateSandboxRequest { image: &image_ref })
            .send()
            .await
            .map_err(|e| MngrError::Provider { message: format!("sandbox restart request failed: {e}") })?
            .json::<CreateSandboxResponse>()
            .await
            .map_err(|e| MngrError::Provider { message: format!("malformed create response: {e}") })?;
        record.certified.stop_reason = mngr_core::StopReason::None;
        record.container_id = Some(response.sandbox_id.clone());
        let name = record.certified.host_name.clone();
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(ServerlessHost {
            id: *host,
            name,
            store,
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            api_key: self.config.api_key.clone(),
            sandbox_id: response.sandbox_id,
        }))
    }

    async fn destroy_host(&self, host: &HostId) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        if let Ok(Some(record)) = store.read_record() {
            if let Some(sandbox_id) = record.container_id {
                let _ = self
                    .client
                    .delete(format!("{}/sandboxes/{sandbox_id}", self.config.base_url))
                    .bearer_auth(&self.config.api_key)
                    .send()
                    .await;
            }
        } else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        }
        tokio::fs::remove_dir_all(&dir).await.map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn get_host(&self, host: &HostId) -> Result<Box<dyn HostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        Ok(Box::new(ServerlessHost {
            id: *host,
            name: record.certified.host_name,
            store,
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            api_key: self.config.api_key.clone(),
            sandbox_id: record.container_id.unwrap_or_default(),
        }))
    }

    async fn get_online_host(&self, host: &HostId) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        Ok(Box::new(ServerlessHost {
            id: *host,
            name: record.certified.host_name,
            store,
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            api_key: self.config.api_key.clone(),
            sandbox_id: record.container_id.unwrap_or_default(),
        }))
    }

    async fn list_hosts(&self, include_destroyed: bool) -> Vec<HostSummary> {
        let mut summaries = Vec::new();
        let Ok(entries) = std::fs::read_dir(&self.root) else { return summaries };
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let dir = entry.path();
            let store = HostStore::new(&dir);
            let Ok(Some(record)) = store.read_record() else { continue };
            let Ok(id) = entry.file_name().to_string_lossy().parse::<HostId>() else { continue };
            let state = if record.certified.stop_reason != mngr_core::StopReason::None {
                HostState::Stopped
            } else {
                HostState::Running
            };
            if state == HostState::Destroyed && !include_destroyed {
                continue;
            }
            summaries.push(HostSummary { id, name: record.certified.host_name, state });
        }
        summaries
    }

    async fn get_host_resources(&self, _host: &HostId) -> Result<HostResources, MngrError> {
        // Sandboxes bill by actual usage rather than a fixed allocation; a
        // fixed default keeps `mngr fleet` resource reporting non-fatal here.
        Ok(HostResources { cpu: 1.0, memory_gb: 2.0, disk_gb: None, gpus: None })
    }

    async fn set_tags(&self, host: &HostId, tags: BTreeMap<String, String>) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        store.write_tags(&tags).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn create_snapshot(&self, host: &HostId, name: mngr_core::names::SnapshotName) -> Result<mngr_core::SnapshotEntry, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let mut record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        let sandbox_id = record.container_id.clone().ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        let response = self
            .client
            .post(format!("{}/sandboxes/snapshot", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&CreateSnapshotRequest { sandbox_id: &sandbox_id, name: name.as_str() })
            .send()
            .await
            .map_err(|e| MngrError::Provider { message: format!("snapshot request failed: {e}") })?
            .error_for_status()
            .map_err(|e| MngrError::Provider { message: format!("snapshot failed: {e}") })?
            .json::<CreateSnapshotResponse>()
            .await
            .map_err(|e| MngrError::Provider { message: format!("malformed snapshot response: {e}") })?;
        let now = SystemClock.epoch_ms();
        let entry = mngr_core::SnapshotEntry { id: SnapshotId::new(response.snapshot_id), name, created_at: now };
        record.certified.push_snapshot(entry.clone(), now);
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(entry)
    }
}

#[cfg(test)]
#[path = "serverless_tests.rs"]
mod tests;
