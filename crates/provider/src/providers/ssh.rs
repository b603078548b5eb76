// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The SSH backend: a fixed remote machine reached over `russh`. Unlike
//! `local`, nothing here touches the local filesystem — every read and
//! write of a host's durable state goes through a shell command run over
//! the same connection `execute_command` uses, since `mngr-store`'s path
//! helpers assume local disk access.
//!
//! Grounding for this backend is thinner than `local`'s: the filtered
//! `original_source/` tree keeps `ssh_host_setup.py` (the C9 protocol,
//! translated in `crate::ssh_setup`) but not the provider class that drives
//! it, so the connection-management shape below follows `russh`'s own
//! client example conventions rather than a line-for-line original.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mngr_core::{
    AgentId, AgentName, AgentRecord, CertifiedHostData, Clock, HostId, HostName, HostRecord, HostState,
    MngrError, SystemClock,
};
use russh::client::{self, Handle};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::agent::{CommandExecutor, TmuxAgentInterface};
use crate::capability::Capabilities;
use crate::contract::{
    AgentCreateOptions, AgentInterface, CommandResult, HostInterface, HostResources, HostSummary,
    OnlineHostInterface, Provider, ProvisionCtx, WorkDirOptions,
};

const TMUX_PREFIX: &str = "mngr-";
/// Where a host's durable state lives on the remote filesystem, mirroring
/// the layout `mngr_store::HostPaths` computes for local hosts.
const REMOTE_STATE_DIR: &str = "/var/lib/mngr/host";

/// Accepts whatever host key the configured `known_hosts` entries already
/// allowed in at setup time (C9 installs them up front); this handler only
/// governs the client's own verification, which the fixed-remote-machine
/// model treats as already trusted.
struct AcceptAllHostKeys;

#[async_trait]
impl client::Handler for AcceptAllHostKeys {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &russh_keys::key::PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// One open SSH connection, reused across calls to the same host.
pub struct SshConnection {
    handle: Mutex<Handle<AcceptAllHostKeys>>,
    user: String,
}

impl SshConnection {
    pub async fn connect(
        address: &str,
        port: u16,
        user: &str,
        private_key: &russh_keys::key::KeyPair,
    ) -> Result<Self, MngrError> {
        let config = Arc::new(client::Config::default());
        let mut handle = client::connect(config, (address, port), AcceptAllHostKeys)
            .await
            .map_err(|e| MngrError::Provider { message: format!("ssh connect to {address}:{port} failed: {e}") })?;
        let authenticated = handle
            .authenticate_publickey(user, Arc::new(private_key.clone()))
            .await
            .map_err(|e| MngrError::Provider { message: format!("ssh auth failed: {e}") })?;
        if !authenticated {
            return Err(MngrError::Provider { message: "ssh public key authentication rejected".to_string() });
        }
        Ok(Self { handle: Mutex::new(handle), user: user.to_string() })
    }

    /// Run `cmd` in a fresh channel and collect its stdout/stderr/exit code.
    pub async fn exec(&self, cmd: &str, timeout: Option<Duration>) -> Result<CommandResult, MngrError> {
        let handle = self.handle.lock().await;
        let run = async {
            let mut channel = handle
                .channel_open_session()
                .await
                .map_err(|e| MngrError::Provider { message: format!("ssh channel open failed: {e}") })?;
            channel
                .exec(true, cmd)
                .await
                .map_err(|e| MngrError::Provider { message: format!("ssh exec failed: {e}") })?;

            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let mut returncode = None;
            while let Some(msg) = channel.wait().await {
                match msg {
                    russh::ChannelMsg::Data { data } => stdout.extend_from_slice(&data),
                    russh::ChannelMsg::ExtendedData { data, ext: 1 } => stderr.extend_from_slice(&data),
                    russh::ChannelMsg::ExitStatus { exit_status } => returncode = Some(exit_status as i32),
                    _ => {}
                }
            }
            Ok(CommandResult {
                stdout: String::from_utf8_lossy(&stdout).to_string(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
                returncode,
            })
        };
        match timeout {
            Some(t) => tokio::time::timeout(t, run)
                .await
                .map_err(|_| MngrError::Provider { message: format!("command timed out: {cmd}") })?,
            None => run.await,
        }
    }
}

struct SshExecutor(Arc<SshConnection>);

#[async_trait]
impl CommandExecutor for SshExecutor {
    async fn run(&self, command: &str) -> Result<bool, MngrError> {
        Ok(self.0.exec(command, None).await?.success())
    }
}

pub struct SshHost {
    id: HostId,
    name: HostName,
    conn: Arc<SshConnection>,
}

impl SshHost {
    pub fn new(id: HostId, name: HostName, conn: Arc<SshConnection>) -> Self {
        Self { id, name, conn }
    }

    fn state_dir(&self) -> String {
        format!("{REMOTE_STATE_DIR}/{}", self.id)
    }

    fn data_json_path(&self) -> String {
        format!("{}/data.json", self.state_dir())
    }

    fn agent_data_json_path(&self, id: &AgentId) -> String {
        format!("{}/agents/{id}/data.json", self.state_dir())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>, MngrError> {
        let result = self.conn.exec(&format!("cat {}", shell_quote(path)), None).await?;
        if !result.success() {
            return Ok(None);
        }
        serde_json::from_str(&result.stdout)
            .map(Some)
            .map_err(|e| MngrError::Provider { message: format!("malformed JSON at {path}: {e}") })
    }

    async fn write_json<T: serde::Serialize>(&self, path: &str, value: &T) -> Result<(), MngrError> {
        let body = serde_json::to_string_pretty(value).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        if let Some(parent) = Path::new(path).parent() {
            self.conn.exec(&format!("mkdir -p {}", shell_quote(&parent.display().to_string())), None).await?;
        }
        let cmd = format!(
            "cat > {} <<'MNGR_JSON_EOF'\n{}\nMNGR_JSON_EOF",
            shell_quote(path),
            body
        );
        let result = self.conn.exec(&cmd, None).await?;
        if !result.success() {
            return Err(MngrError::Provider { message: format!("failed to write {path}: {}", result.stderr) });
        }
        Ok(())
    }

    fn tmux_agent(&self, record: &AgentRecord) -> TmuxAgentInterface<SshExecutor> {
        TmuxAgentInterface::new(
            record.id,
            record.name.clone(),
            TMUX_PREFIX.to_string(),
            record.agent_type.clone(),
            SshExecutor(self.conn.clone()),
        )
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

#[async_trait]
impl HostInterface for SshHost {
    fn get_name(&self) -> &HostName {
        &self.name
    }

    fn get_id(&self) -> HostId {
        self.id
    }

    async fn get_certified_data(&self) -> Result<CertifiedHostData, MngrError> {
        self.read_json::<HostRecord>(&self.data_json_path())
            .await?
            .map(|r| r.certified)
            .ok_or_else(|| MngrError::HostNotFound { name: self.name.to_string() })
    }

    async fn get_state(&self) -> Result<HostState, MngrError> {
        let Some(record) = self.read_json::<HostRecord>(&self.data_json_path()).await? else {
            return Ok(HostState::Destroyed);
        };
        let banner_check = self.conn.exec("ss -H -tnl sport = :22 | grep -q LISTEN", None).await.ok();
        let ssh_accepting = banner_check.map(|r| r.success()).unwrap_or(false);
        Ok(mngr_core::lifecycle::derive_host_state(mngr_core::lifecycle::HostStateSignals {
            gone_from_provider: false,
            stop_reason: record.certified.stop_reason,
            provider_building: false,
            ssh_accepting,
            data_json_readable: true,
        }))
    }

    async fn get_agents(&self) -> Result<Vec<AgentRecord>, MngrError> {
        let list = self
            .conn
            .exec(&format!("ls -1 {}/agents 2>/dev/null", shell_quote(&self.state_dir())), None)
            .await?;
        let mut agents = Vec::new();
        for id_str in list.stdout.lines() {
            let id = AgentId::from_string(id_str);
            if let Some(record) = self.read_json::<AgentRecord>(&self.agent_data_json_path(&id)).await? {
                agents.push(record);
            }
        }
        Ok(agents)
    }
}

#[async_trait]
impl OnlineHostInterface for SshHost {
    async fn execute_command(
        &self,
        cmd: &str,
        user: Option<&str>,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<CommandResult, MngrError> {
        let mut full = String::new();
        if let Some(cwd) = cwd {
            full.push_str(&format!("cd {} && ", shell_quote(&cwd.display().to_string())));
        }
        match user {
            Some(user) if user != self.conn.user => {
                full.push_str(&format!("sudo -u {user} sh -c {}", shell_quote(cmd)));
            }
            _ => full.push_str(cmd),
        }
        self.conn.exec(&full, timeout).await
    }

    async fn create_agent_work_dir(
        &self,
        _source_host: Option<&dyn OnlineHostInterface>,
        source_path: &Path,
        options: &WorkDirOptions,
    ) -> Result<PathBuf, MngrError> {
        let dest = PathBuf::from(format!("{}/tmp/wd-{}", self.state_dir(), nanoid::nanoid!(12)));
        self.conn.exec(&format!("mkdir -p {}", shell_quote(&dest.display().to_string())), None).await?;
        let exclude = if options.include_git_dir { "" } else { "--exclude=.git " };
        let cmd = format!(
            "rsync -a {exclude}{}/ {}",
            shell_quote(&source_path.display().to_string()),
            shell_quote(&dest.display().to_string())
        );
        self.conn.exec(&cmd, None).await?.check_ok()?;
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
        self.write_json(&self.agent_data_json_path(&id), &record).await?;
        Ok(Box::new(self.tmux_agent(&record)))
    }

    async fn provision_agent(&self, _agent: &dyn AgentInterface, ctx: &ProvisionCtx) -> Result<(), MngrError> {
        self.conn
            .exec(&format!("mkdir -p {}", shell_quote(&ctx.work_dir.display().to_string())), None)
            .await?
            .check_ok()
    }

    async fn start_agents(&self, ids: &[AgentId]) -> Result<(), MngrError> {
        for id in ids {
            let Some(record) = self.read_json::<AgentRecord>(&self.agent_data_json_path(id)).await? else { continue };
            let session = format!("{TMUX_PREFIX}{}", record.name.as_str());
            let has_session = self.conn.exec(&format!("tmux has-session -t {}", shell_quote(&session)), None).await?.success();
            if has_session {
                continue;
            }
            let mut parts = vec![record.command.as_str().to_string()];
            parts.extend(record.cli_args.iter().cloned());
            let inner = parts.join(" ");
            let cmd = format!(
                "tmux new-session -d -s {} -c {} {}",
                shell_quote(&session),
                shell_quote(&record.work_dir.display().to_string()),
                shell_quote(&inner)
            );
            self.conn.exec(&cmd, None).await?.check_ok()?;
        }
        Ok(())
    }

    async fn stop_agents(&self, ids: &[AgentId]) -> Result<(), MngrError> {
        for id in ids {
            let Some(record) = self.read_json::<AgentRecord>(&self.agent_data_json_path(id)).await? else { continue };
            let session = format!("{TMUX_PREFIX}{}", record.name.as_str());
            let _ = self.conn.exec(&format!("tmux kill-session -t {}", shell_quote(&session)), None).await;
        }
        Ok(())
    }

    async fn destroy_agent(&self, agent: &dyn AgentInterface) -> Result<(), MngrError> {
        let session = format!("{TMUX_PREFIX}{}", agent.name().as_str());
        let _ = self.conn.exec(&format!("tmux kill-session -t {}", shell_quote(&session)), None).await;
        let dir = format!("{}/agents/{}", self.state_dir(), agent.id());
        self.conn.exec(&format!("rm -rf {}", shell_quote(&dir)), None).await?.check_ok()
    }

    async fn get_agent(&self, id: &AgentId) -> Result<Box<dyn AgentInterface>, MngrError> {
        let record = self
            .read_json::<AgentRecord>(&self.agent_data_json_path(id))
            .await?
            .ok_or_else(|| MngrError::AgentNotFound { name: id.to_string() })?;
        Ok(Box::new(self.tmux_agent(&record)))
    }

    async fn rename_agent_session(&self, agent: &dyn AgentInterface, new_name: &AgentName) -> Result<(), MngrError> {
        let old_session = format!("{TMUX_PREFIX}{}", agent.name().as_str());
        let new_session = format!("{TMUX_PREFIX}{}", new_name.as_str());
        let has_old = self.conn.exec(&format!("tmux has-session -t {}", shell_quote(&old_session)), None).await?.success();
        if !has_old {
            return Ok(());
        }
        self.conn
            .exec(&format!("tmux rename-session -t {} {}", shell_quote(&old_session), shell_quote(&new_session)), None)
            .await?
            .check_ok()
    }

    async fn set_env_vars(&self, mapping: &BTreeMap<String, String>) -> Result<(), MngrError> {
        let body = mapping.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("\n");
        let path = format!("{}/env", self.state_dir());
        let cmd = format!("cat > {} <<'MNGR_ENV_EOF'\n{}\nMNGR_ENV_EOF", shell_quote(&path), body);
        self.conn.exec(&cmd, None).await?.check_ok()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ssh()
    }
}

trait CheckOk {
    fn check_ok(self) -> Result<(), MngrError>;
}

impl CheckOk for CommandResult {
    fn check_ok(self) -> Result<(), MngrError> {
        if self.success() {
            Ok(())
        } else {
            Err(MngrError::Provider { message: self.stderr })
        }
    }
}

/// Configuration for the single fixed machine an SSH provider instance
/// targets (§4.10's "fixed remote machine" model: one provider instance,
/// one host).
pub struct SshProviderConfig {
    pub address: String,
    pub port: u16,
    pub user: String,
    pub private_key: russh_keys::key::KeyPair,
}

pub struct SshProvider {
    instance_name: mngr_core::ProviderInstanceName,
    config: SshProviderConfig,
}

impl SshProvider {
    pub fn new(instance_name: mngr_core::ProviderInstanceName, config: SshProviderConfig) -> Self {
        Self { instance_name, config }
    }

    async fn connect(&self) -> Result<Arc<SshConnection>, MngrError> {
        let conn = SshConnection::connect(&self.config.address, self.config.port, &self.config.user, &self.config.private_key).await?;
        Ok(Arc::new(conn))
    }
}

#[async_trait]
impl Provider for SshProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ssh()
    }

    async fn create_host(
        &self,
        name: HostName,
        _image: Option<mngr_core::ImageReference>,
        tags: BTreeMap<String, String>,
        _build_args: BTreeMap<String, String>,
        _start_args: BTreeMap<String, String>,
        known_hosts: Vec<String>,
        authorized_keys: Vec<String>,
        _snapshot: Option<mngr_core::SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let id = HostId::derive(self.instance_name.as_str(), name.as_str());
        let conn = self.connect().await?;

        conn.exec(&crate::ssh_setup::build_check_and_install_packages_command(&format!("{REMOTE_STATE_DIR}/{id}")), None)
            .await?
            .check_ok()?;

        let client_keys = authorized_keys.join("\n");
        let host_keypair = russh_keys::key::KeyPair::generate_ed25519().ok_or_else(|| MngrError::Provider {
            message: "failed to generate an ed25519 host key pair".to_string(),
        })?;
        let host_public_key = russh_keys::PublicKeyBase64::public_key_base64(&host_keypair.clone_public_key());
        let host_private_key = host_keypair
            .serialize_openssh()
            .map_err(|e| MngrError::Provider { message: format!("failed to serialize host private key: {e}") })?;
        conn.exec(
            &crate::ssh_setup::build_configure_ssh_command(&self.config.user, &client_keys, &host_private_key, &host_public_key),
            None,
        )
        .await?
        .check_ok()?;
        if let Some(cmd) = crate::ssh_setup::build_add_known_hosts_command(&self.config.user, &known_hosts) {
            conn.exec(&cmd, None).await?;
        }
        conn.exec(&crate::ssh_setup::build_start_activity_watcher_command(&format!("{REMOTE_STATE_DIR}/{id}")), None).await?;

        let host = SshHost::new(id, name.clone(), conn);
        let mut certified = CertifiedHostData::new(id, name, SystemClock.epoch_ms());
        certified.user_tags = tags;
        let record = HostRecord {
            certified,
            ssh_host: Some(self.config.address.clone()),
            ssh_port: Some(self.config.port),
            ssh_host_public_key: Some(host_public_key),
            container_id: None,
            config: None,
        };
        host.write_json(&host.data_json_path(), &record).await?;
        Ok(Box::new(host))
    }

    async fn stop_host(&self, host: &HostId, _create_snapshot: bool, _timeout: Duration) -> Result<(), MngrError> {
        let _ = host;
        Err(MngrError::NotSupported { what: "stop_host on the ssh backend (fixed remote machine)" })
    }

    async fn start_host(
        &self,
        _host: &HostId,
        _snapshot_id: Option<&mngr_core::SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        Err(MngrError::NotSupported { what: "start_host on the ssh backend (fixed remote machine)" })
    }

    async fn destroy_host(&self, host: &HostId) -> Result<(), MngrError> {
        let conn = self.connect().await?;
        conn.exec(&format!("rm -rf {}", shell_quote(&format!("{REMOTE_STATE_DIR}/{host}"))), None).await?.check_ok()
    }

    async fn get_host(&self, host: &HostId) -> Result<Box<dyn HostInterface>, MngrError> {
        let conn = self.connect().await?;
        let path = format!("{REMOTE_STATE_DIR}/{host}/data.json");
        let result = conn.exec(&format!("cat {}", shell_quote(&path)), None).await?;
        if !result.success() {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        }
        let record: HostRecord = serde_json::from_str(&result.stdout)
            .map_err(|e| MngrError::Provider { message: format!("malformed JSON at {path}: {e}") })?;
        Ok(Box::new(SshHost::new(*host, record.certified.host_name, conn)))
    }

    async fn get_online_host(&self, host: &HostId) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        let conn = self.connect().await?;
        let path = format!("{REMOTE_STATE_DIR}/{host}/data.json");
        let result = conn.exec(&format!("cat {}", shell_quote(&path)), None).await?;
        if !result.success() {
            return Err(MngrError::HostNotFound { name: host.to_string() });
        }
        let record: HostRecord = serde_json::from_str(&result.stdout)
            .map_err(|e| MngrError::Provider { message: format!("malformed JSON at {path}: {e}") })?;
        Ok(Box::new(SshHost::new(*host, record.certified.host_name, conn)))
    }

    async fn list_hosts(&self, _include_destroyed: bool) -> Vec<HostSummary> {
        // One provider instance targets exactly one fixed machine (§4.10);
        // there is nothing to enumerate beyond what `get_host` already covers.
        Vec::new()
    }

    async fn get_host_resources(&self, _host: &HostId) -> Result<HostResources, MngrError> {
        let conn = self.connect().await?;
        let result = conn.exec("nproc; free -g | awk '/Mem:/{print $2}'", None).await?;
        let mut lines = result.stdout.lines();
        let cpu = lines.next().and_then(|l| l.trim().parse::<f64>().ok()).unwrap_or(1.0);
        let memory_gb = lines.next().and_then(|l| l.trim().parse::<f64>().ok()).unwrap_or(0.0);
        Ok(HostResources { cpu, memory_gb, disk_gb: None, gpus: None })
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
