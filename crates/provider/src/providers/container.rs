// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container backend: every host is a Kubernetes pod reached through
//! `kube`'s exec API, with the pod itself doing nothing but sleeping and
//! hosting tmux sessions. Bookkeeping (host/agent records) stays on the
//! orchestrator's own disk via `mngr-store`, the same layout `local` uses —
//! only the command-execution primitive differs.
//!
//! The filtered original-source tree keeps only `docker/host_store.py`
//! (non-test) for this backend, too thin to ground the pod lifecycle
//! against directly; the `kube::Api<Pod>` usage below follows that crate's
//! own documented conventions instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::api::{AttachParams, DeleteParams, PostParams};
use kube::{Api, Client};
use mngr_core::{
    AgentId, AgentName, AgentRecord, CertifiedHostData, Clock, HostId, HostName, HostRecord, HostState,
    MngrError, SystemClock,
};
use mngr_store::{AgentStore, HostPaths, HostStore};
use tokio::io::AsyncReadExt;

use crate::agent::{CommandExecutor, TmuxAgentInterface};
use crate::capability::Capabilities;
use crate::contract::{
    AgentCreateOptions, AgentInterface, CommandResult, HostInterface, HostResources, HostSummary,
    OnlineHostInterface, Provider, ProvisionCtx, WorkDirOptions,
};

const TMUX_PREFIX: &str = "mngr-";
const AGENT_CONTAINER_NAME: &str = "mngr-agent";

fn pod_name(host_id: &HostId) -> String {
    format!("mngr-{}", host_id.to_string().replace('-', "").to_lowercase())
}

struct ContainerExecutor {
    pods: Api<Pod>,
    pod_name: String,
}

impl ContainerExecutor {
    async fn exec(&self, command: &str) -> Result<CommandResult, MngrError> {
        let attach = AttachParams::default().stdout(true).stderr(true);
        let mut process = self
            .pods
            .exec(&self.pod_name, vec!["sh", "-c", command], &attach)
            .await
            .map_err(|e| MngrError::Provider { message: format!("pod exec failed: {e}") })?;

        let mut stdout = String::new();
        if let Some(mut stream) = process.stdout_stream() {
            let _ = stream.read_to_string(&mut stdout).await;
        }
        let mut stderr = String::new();
        if let Some(mut stream) = process.stderr_stream() {
            let _ = stream.read_to_string(&mut stderr).await;
        }
        // `AttachedProcess::join` resolves once the remote process exits; `kube`
        // doesn't surface a numeric exit code through this API, so treat a
        // clean join as success and anything else as a nonzero exit.
        let returncode = match process.join().await {
            Ok(()) => Some(0),
            Err(_) => Some(1),
        };
        Ok(CommandResult { stdout, stderr, returncode })
    }
}

#[async_trait]
impl CommandExecutor for ContainerExecutor {
    async fn run(&self, command: &str) -> Result<bool, MngrError> {
        Ok(self.exec(command).await?.success())
    }
}

pub struct ContainerHost {
    id: HostId,
    name: HostName,
    store: HostStore,
    pods: Api<Pod>,
}

impl ContainerHost {
    fn new(id: HostId, name: HostName, host_dir: impl Into<PathBuf>, pods: Api<Pod>) -> Self {
        Self { id, name, store: HostStore::new(host_dir), pods }
    }

    fn agent_store(&self, id: AgentId) -> AgentStore {
        AgentStore::new(HostPaths::new(self.store.paths().root()), id)
    }

    fn executor(&self) -> ContainerExecutor {
        ContainerExecutor { pods: self.pods.clone(), pod_name: pod_name(&self.id) }
    }

    fn tmux_agent(&self, record: &AgentRecord) -> TmuxAgentInterface<ContainerExecutor> {
        TmuxAgentInterface::new(record.id, record.name.clone(), TMUX_PREFIX.to_string(), record.agent_type.clone(), self.executor())
    }
}

#[async_trait]
impl HostInterface for ContainerHost {
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
        let pod_running = self
            .pods
            .get_opt(&pod_name(&self.id))
            .await
            .ok()
            .flatten()
            .and_then(|pod| pod.status)
            .and_then(|status| status.phase)
            .map(|phase| phase == "Running")
            .unwrap_or(false);
        Ok(mngr_core::lifecycle::derive_host_state(mngr_core::lifecycle::HostStateSignals {
            gone_from_provider: !pod_running && record.certified.stop_reason == mngr_core::StopReason::None,
            stop_reason: record.certified.stop_reason,
            provider_building: false,
            ssh_accepting: pod_running,
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
impl OnlineHostInterface for ContainerHost {
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
        // The pod and the orchestrator don't share a filesystem; a real
        // deployment would stage the work dir through a sidecar or `kubectl
        // cp`-equivalent. `create_host` below mounts `source_path`'s parent
        // as the pod's working volume, so `rsync` inside the pod suffices.
        let cmd = format!("mkdir -p '{}' && rsync -a {exclude}'{}/' '{}'", dest.display(), source_path.display(), dest.display());
        self.executor().exec(&cmd).await?.success().then_some(()).ok_or_else(|| MngrError::Provider {
            message: "failed to populate container work dir".to_string(),
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
            MngrError::Provider { message: "failed to create work dir in pod".to_string() }
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
        Capabilities::container()
    }
}

pub struct ContainerProvider {
    instance_name: mngr_core::ProviderInstanceName,
    root: PathBuf,
    client: Client,
    namespace: String,
}

impl ContainerProvider {
    pub fn new(instance_name: mngr_core::ProviderInstanceName, root: impl Into<PathBuf>, client: Client, namespace: impl Into<String>) -> Self {
        Self { instance_name, root: root.into(), client, namespace: namespace.into() }
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn host_dir(&self, id: &HostId) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[async_trait]
impl Provider for ContainerProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::container()
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

        let pods = self.pods();
        let image_ref = image.as_ref().map(|i| i.as_str().to_string()).unwrap_or_else(|| "ubuntu:24.04".to_string());
        let pod = Pod {
            metadata: kube::api::ObjectMeta { name: Some(pod_name(&id)), ..Default::default() },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: AGENT_CONTAINER_NAME.to_string(),
                    image: Some(image_ref),
                    command: Some(vec!["sleep".to_string(), "infinity".to_string()]),
                    ..Default::default()
                }],
                restart_policy: Some("Never".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        pods.create(&PostParams::default(), &pod)
            .await
            .map_err(|e| MngrError::Provider { message: format!("failed to create pod: {e}") })?;

        let now = SystemClock.epoch_ms();
        let mut certified = CertifiedHostData::new(id, name.clone(), now);
        certified.user_tags = tags;
        certified.image = image;
        let record = HostRecord { certified, ssh_host: None, ssh_port: None, ssh_host_public_key: None, container_id: Some(pod_name(&id)), config: None };
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(ContainerHost::new(id, name, dir, pods)))
    }

    async fn stop_host(&self, host: &HostId, _create_snapshot: bool, timeout: Duration) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        let mut params = DeleteParams::default();
        params.grace_period_seconds = Some(timeout.as_secs() as u32);
        let _ = self.pods().delete(&pod_name(host), &params).await;
        record.certified.stop_reason = mngr_core::StopReason::Stopped;
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn start_host(&self, host: &HostId, _snapshot_id: Option<&mngr_core::SnapshotId>) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let Some(mut record) = store.read_record().map_err(|e| MngrError::Provider { message: e.to_string() })? else {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        };
        if record.certified.stop_reason == mngr_core::StopReason::None {
            return Err(MngrError::HostNotStopped { name: record.certified.host_name.to_string() });
        }
        let pods = self.pods();
        let image_ref = record.certified.image.as_ref().map(|i| i.as_str().to_string()).unwrap_or_else(|| "ubuntu:24.04".to_string());
        let pod = Pod {
            metadata: kube::api::ObjectMeta { name: Some(pod_name(host)), ..Default::default() },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: AGENT_CONTAINER_NAME.to_string(),
                    image: Some(image_ref),
                    command: Some(vec!["sleep".to_string(), "infinity".to_string()]),
                    ..Default::default()
                }],
                restart_policy: Some("Never".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        pods.create(&PostParams::default(), &pod).await.map_err(|e| MngrError::Provider { message: format!("failed to recreate pod: {e}") })?;
        record.certified.stop_reason = mngr_core::StopReason::None;
        let name = record.certified.host_name.clone();
        store.write_record(&record).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        Ok(Box::new(ContainerHost::new(*host, name, dir, pods)))
    }

    async fn destroy_host(&self, host: &HostId) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        if !dir.exists() {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        }
        let _ = self.pods().delete(&pod_name(host), &DeleteParams::default()).await;
        tokio::fs::remove_dir_all(&dir).await.map_err(|e| MngrError::Provider { message: e.to_string() })
    }

    async fn get_host(&self, host: &HostId) -> Result<Box<dyn HostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        Ok(Box::new(ContainerHost::new(*host, record.certified.host_name, dir, self.pods())))
    }

    async fn get_online_host(&self, host: &HostId) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        let record = store
            .read_record()
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        Ok(Box::new(ContainerHost::new(*host, record.certified.host_name, dir, self.pods())))
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
            let host = ContainerHost::new(id, record.certified.host_name.clone(), dir, self.pods());
            let Ok(state) = host.get_state().await else { continue };
            if state == HostState::Destroyed && !include_destroyed {
                continue;
            }
            summaries.push(HostSummary { id, name: record.certified.host_name, state });
        }
        summaries
    }

    async fn get_host_resources(&self, host: &HostId) -> Result<HostResources, MngrError> {
        let pod = self
            .pods()
            .get_opt(&pod_name(host))
            .await
            .map_err(|e| MngrError::Provider { message: e.to_string() })?
            .ok_or_else(|| MngrError::HostNotFound { name: host.to_string() })?;
        let requests = pod
            .spec
            .and_then(|spec| spec.containers.into_iter().next())
            .and_then(|c| c.resources)
            .and_then(|r| r.requests);
        let cpu = requests
            .as_ref()
            .and_then(|r| r.get("cpu"))
            .and_then(|q| q.0.parse::<f64>().ok())
            .unwrap_or(1.0);
        let memory_gb = requests
            .as_ref()
            .and_then(|r| r.get("memory"))
            .and_then(|q| q.0.trim_end_matches("Gi").parse::<f64>().ok())
            .unwrap_or(0.0);
        Ok(HostResources { cpu, memory_gb, disk_gb: None, gpus: None })
    }

    async fn set_tags(&self, host: &HostId, tags: BTreeMap<String, String>) -> Result<(), MngrError> {
        let dir = self.host_dir(host);
        let store = HostStore::new(&dir);
        store.write_tags(&tags).map_err(|e| MngrError::Provider { message: e.to_string() })
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
