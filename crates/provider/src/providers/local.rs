// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local backend: every host is a directory on the machine running
//! `mngr` itself, and every agent is a tmux session in the same process
//! tree. The reference backend — no network round trip stands between a
//! bug here and a failing test.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use mngr_core::{
    AgentId, AgentName, AgentRecord, CertifiedHostData, Clock, HostId, HostName, HostRecord, HostState,
    MngrError, SystemClock,
};
use mngr_store::{AgentStore, HostPaths, HostStore};
use mngr_supervisor::process::{run, RunOptions};
use tokio::sync::watch;

use crate::agent::{CommandExecutor, TmuxAgentInterface};
use crate::capability::Capabilities;
use crate::contract::{
    AgentCreateOptions, AgentInterface, CommandResult, HostInterface, HostResources, HostSummary,
    OnlineHostInterface, Provider, ProvisionCtx, WorkDirOptions,
};

const TMUX_PREFIX: &str = "mngr-";

async fn run_shell(cmd: &str, cwd: Option<&Path>, timeout: Option<Duration>) -> Result<CommandResult, MngrError> {
    let (_tx, rx) = watch::channel(false);
    let mut options = RunOptions::new();
    options.cwd = cwd.map(Path::to_path_buf);
    options.timeout = timeout;
    let command = vec!["sh".to_string(), "-c".to_string(), cmd.to_string()];
    let finished = run(&command, rx, options).await.map_err(|e| MngrError::Provider { message: e.to_string() })?;
    Ok(CommandResult { stdout: finished.stdout, stderr: finished.stderr, returncode: finished.returncode })
}

/// Runs a shell command on the local machine; shared by `LocalHost` and its
/// agents' tmux interfaces.
struct LocalExecutor;

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run(&self, command: &str) -> Result<bool, MngrError> {
        Ok(run_shell(command, None, None).await?.success())
    }
}

async fn tmux_session_exists(session: &str) -> bool {
    run_shell(&format!("tmux has-session -t '{session}' 2>/dev/null"), None, None)
        .await
        .map(|r| r.success())
        .unwrap_or(false)
}

pub struct LocalHost {
    id: HostId,
    name: HostName,
    store: HostStore,
}

impl LocalHost {
    pub fn new(id: HostId, name: HostName, host_dir: impl Into<PathBuf>) -> Self {
        Self { id, name, store: HostStore::new(host_dir) }
    }

    fn agent_store(&self, id: AgentId) -> AgentStore {
        AgentStore::new(HostPaths::new(self.store.paths().root()), id)
    }

    fn tmux_agent(&self, record: &AgentRecord) -> TmuxAgentInterface<LocalExecutor> {
        TmuxAgentInterface::new(
            record.id,
            record.name.clone(),
            TMUX_PREFIX.to_string(),
            record.agent_type.clone(),
            LocalExecutor,
        )
    }
}

#[async_trait]
impl HostInterface for LocalHost {
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
        Ok(mngr_core::lifecycle::derive_host_state(mngr_core::lifecycle::HostStateSignals {
            gone_from_provider: false,
            stop_reason: record.certified.stop_reason,
            provider_building: false,
            ssh_accepting: true,
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
impl OnlineHostInterface for LocalHost {
    async fn execute_command(
        &self,
        cmd: &str,
        _user: Option<&str>,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, MngrError> {
        run_shell(cmd, cwd, timeout).await
    }

    async fn create_agent_work_dir(
        &self,
        _source_host: Option<&dyn OnlineHostInterface>,
        source_path: &Path,
        options: &WorkDirOptions,
    ) -> Result<PathBuf, MngrError> {
        let slug = format!("wd-{}", nanoid::nanoid!(12));
        let dest = self.store.paths().root().join("tmp").join(slug);
        crate::workdir::populate_work_dir(options.strategy, source_path, &dest, options.include_git_dir).await?;
        Ok(dest)
    }

    async fn create_agent_state(
        &self,
        work_dir: &Path,
        options: AgentCreateOptions,
    ) -> Result<Box<dyn AgentInterface>, MngrError> {
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
        let store = self.agent_store(id);
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(self.tmux_agent(&record)))
    }

    async fn provision_agent(&self, _agent: &dyn AgentInterface, ctx: &ProvisionCtx) -> Result<(), MngrError> {
        tokio::fs::create_dir_all(&ctx.work_dir)
            .await
            .map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn start_agents(&self, ids: &[AgentId]) -> Result<(), MngrError> {
        for id in ids {
            let Some(record) = self.agent_store(*id).read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
                continue;
            };
            let session = format!("{TMUX_PREFIX}{}", record.name.as_str());
            if tmux_session_exists(&session).await {
                continue;
            }
            // The agent's own record already carries its resolved base command
            // and cli_args (fixed at `create_agent_state` time); re-resolving
            // through the agent-type registry here would be redundant, so the
            // command is built directly instead of going through
            // `AgentInterface::assemble_command` (that method is for ad-hoc
            // per-call overrides, e.g. `exec`, not the steady-state start path).
            let mut parts = vec![record.command.as_str().to_string()];
            parts.extend(record.cli_args.iter().cloned());
            let command = parts.join(" ");
            let cmd = format!(
                "tmux new-session -d -s '{session}' -c '{}' '{}'",
                record.work_dir.display(),
                command.replace('\'', "'\\''")
            );
            run_shell(&cmd, None, None).await?.success().then_some(()).ok_or_else(|| MngrError::Provider {
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
            let _ = run_shell(&format!("tmux kill-session -t '{session}'"), None, None).await;
        }
        Ok(())
    }

    async fn destroy_agent(&self, agent: &dyn AgentInterface) -> Result<(), MngrError> {
        let session = format!("{TMUX_PREFIX}{}", agent.name().as_str());
        let _ = run_shell(&format!("tmux kill-session -t '{session}'"), None, None).await;
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
        if !tmux_session_exists(&old_session).await {
            // Idempotent per §4.9: old gone, new present is already "done".
            return Ok(());
        }
        run_shell(&format!("tmux rename-session -t '{old_session}' '{new_session}'"), None, None)
            .await?
            .success()
            .then_some(())
            .ok_or_else(|| MngrError::Provider { message: format!("failed to rename session {old_session}") })
    }

    async fn set_env_vars(&self, mapping: &BTreeMap<String, String>) -> Result<(), MngrError> {
        self.store.write_env(mapping).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::local()
    }
}

/// Root directory under which every local host gets its own subdirectory
/// named after the host's derived id.
pub struct LocalProvider {
    instance_name: mngr_core::ProviderInstanceName,
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(instance_name: mngr_core::ProviderInstanceName, root: impl Into<PathBuf>) -> Self {
        Self { instance_name, root: root.into() }
    }

    fn host_dir(&self, id: &HostId) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::local()
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
        _snapshot: Option<mngr_core::SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let id = HostId::derive(self.instance_name.as_str(), name.as_str());
        let dir = self.host_dir(&id);
        let store = HostStore::new(&dir);
        store.ensure_dirs().map_err(|e| MngrError::Provider { message: e.to_string() })?;
        if store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })?.is_some() {
            return Err(MngrError::HostNameConflict { name: name.to_string() });
        }
        let now = SystemClock.epoch_ms();
        let mut certified = CertifiedHostData::new(id, name.clone(), now);
        certified.user_tags = tags;
        certified.image = image;
        let record = HostRecord { certified, ssh_host: None, ssh_port: None, ssh_host_public_key: None, container_id: None, config: None };
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(LocalHost::new(id, name, dir)))
    }

    async fn stop_host(&self, host: &HostId, _create_snapshot: bool, _timeout: Duration) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        record.certified.stop_reason = mngr_core::StopReason::Stopped;
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn start_host(
        &self,
        host: &HostId,
        _snapshot_id: Option<&mngr_core::SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        if record.certified.stop_reason == mngr_core::StopReason::None {
            return Err(MngrError::HostNotStopped { name: record.certified.host_name.to_string() });
        }
        record.certified.stop_reason = mngr_core::StopReason::None;
        let name = record.certified.host_name.clone();
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(LocalHost::new(*host, name, dir)))
    }

    async fn destroy_host(&self, host: &HostId) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        if !dir.exists() {
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
        Ok(Box::new(LocalHost::new(*host, record.certified.host_name, dir)))
    }

    async fn get_online_host(&self, host: &HostId) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        Ok(Box::new(LocalHost::new(*host, record.certified.host_name, dir)))
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
            let host = LocalHost::new(id, record.certified.host_name.clone(), dir);
            let Ok(state) = host.get_state().await else { continue };
            if state == HostState::Destroyed && !include_destroyed {
                continue;
            }
            summaries.push(HostSummary { id, name: record.certified.host_name, state });
        }
        summaries
    }

    async fn get_host_resources(&self, _host: &HostId) -> Result<HostResources, MngrError> {
        Ok(HostResources { cpu: num_cpus(), memory_gb: 0.0, disk_gb: None, gpus: None })
    }

    async fn set_tags(&self, host: &HostId, tags: BTreeMap<String, String>) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        store.write_tags(&tags).map_err(|e| MngrError::Provider { message: e.to_string() })
    }
}

fn num_cpus() -> f64 {
    std::thread::available_parallelism().map(|n| n.get() as f64).unwrap_or(1.0)
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
