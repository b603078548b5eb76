// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fleet pipeline (C12, §4.12): fan out over the configured provider
//! instances, group by host, and run one of the bulk agent operations.
//!
//! Every mutating operation here returns an [`OpResult`] rather than a bare
//! `Result`: under `ErrorBehavior::Continue` a failure on one agent or host
//! is recorded and the rest of the batch still runs; under
//! `ErrorBehavior::Abort` the first such failure is returned immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mngr_core::{
    AgentId, AgentName, CleanupAction, Clock, ErrorBehavior, HostId, HostState, MngrError, ProviderInstanceName,
    SystemClock,
};
use mngr_provider::{CommandResult, Provider};
use mngr_store::{AgentStore, HostPaths, HostStore};

use crate::filter::{eval, Expr};
use crate::model::{AgentSummary, OpResult};

pub type ProviderMap = BTreeMap<ProviderInstanceName, Arc<dyn Provider>>;

/// Entry point for every C12 operation. Holds the configured provider
/// instances plus the root directory their on-disk state is mirrored under
/// (§4.5; the same layout every backend already writes `HostStore`/
/// `AgentStore` records into).
pub struct Fleet {
    providers: ProviderMap,
    state_root: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub agents: Vec<AgentSummary>,
    pub errors: Vec<(ProviderInstanceName, String)>,
}

impl Fleet {
    pub fn new(providers: ProviderMap, state_root: impl Into<PathBuf>) -> Self {
        Self { providers, state_root: state_root.into() }
    }

    fn host_paths(&self, host: &HostId) -> HostPaths {
        HostPaths::new(self.state_root.join(host.to_string()))
    }

    pub(crate) fn providers(&self) -> &ProviderMap {
        &self.providers
    }

    pub(crate) fn state_root(&self) -> &Path {
        &self.state_root
    }

    /// List every agent across every configured provider, unfiltered. The
    /// building block both `list_agents` and the id-resolution helpers used
    /// by the mutating operations are built on.
    async fn list_all(&self, error_behavior: ErrorBehavior) -> Result<ListResult, MngrError> {
        let now_ms = SystemClock.epoch_ms();
        let mut result = ListResult::default();

        for (instance_name, provider) in &self.providers {
            let hosts = provider.list_hosts(false).await;
            for host_summary in hosts {
                let host = match provider.get_host(&host_summary.id).await {
                    Ok(host) => host,
                    Err(e) => {
                        if error_behavior == ErrorBehavior::Abort {
                            return Err(e);
                        }
                        result.errors.push((instance_name.clone(), e.to_string()));
                        continue;
                    }
                };

                let certified = match host.get_certified_data().await {
                    Ok(data) => data,
                    Err(e) => {
                        if error_behavior == ErrorBehavior::Abort {
                            return Err(e);
                        }
                        result.errors.push((instance_name.clone(), e.to_string()));
                        continue;
                    }
                };

                let agents = match host.get_agents().await {
                    Ok(agents) => agents,
                    Err(e) => {
                        if error_behavior == ErrorBehavior::Abort {
                            return Err(e);
                        }
                        result.errors.push((instance_name.clone(), e.to_string()));
                        continue;
                    }
                };

                for record in agents {
                    let age_seconds = now_ms.saturating_sub(record.create_time) / 1000;
                    let idle_seconds = self.agent_idle_seconds(&host_summary.id, &record.id, now_ms);
                    // An agent on an offline host is always stopped (§4.6);
                    // otherwise this is a best-effort read, since telling
                    // WAITING/DONE/REPLACED apart requires the agent-type's
                    // own reported-file convention, which this crate's
                    // generic listing path does not interpret.
                    let state = if host_summary.state == HostState::Running {
                        mngr_core::AgentLifecycleState::Running
                    } else {
                        mngr_core::AgentLifecycleState::Stopped
                    };

                    result.agents.push(AgentSummary {
                        id: record.id,
                        name: record.name,
                        agent_type: record.agent_type,
                        state,
                        host_id: host_summary.id,
                        host_name: host_summary.name.clone(),
                        host_state: host_summary.state,
                        provider: instance_name.clone(),
                        host_tags: certified.user_tags.clone(),
                        age_seconds,
                        idle_seconds,
                    });
                }
            }
        }

        Ok(result)
    }

    fn agent_idle_seconds(&self, host: &HostId, agent: &AgentId, now_ms: u64) -> Option<u64> {
        let store = AgentStore::new(self.host_paths(host), *agent);
        let mtimes = store.activity_mtimes_ms().ok()?;
        mngr_core::lifecycle::compute_idle_seconds(&mtimes, now_ms)
    }

    /// `list_agents(ctx, include_filters?, exclude_filters?, error_behavior)`
    /// (§4.12): an agent survives if every include filter matches (ANDed)
    /// and no exclude filter matches (ORed, then negated).
    pub async fn list_agents(
        &self,
        include_filters: &[Expr],
        exclude_filters: &[Expr],
        error_behavior: ErrorBehavior,
    ) -> Result<ListResult, MngrError> {
        let mut result = self.list_all(error_behavior).await?;
        result.agents.retain(|agent| {
            let included = include_filters.iter().all(|expr| eval(expr, agent).unwrap_or(false));
            let excluded = exclude_filters.iter().any(|expr| eval(expr, agent).unwrap_or(false));
            included && !excluded
        });
        Ok(result)
    }

    async fn resolve(&self, ids: &[AgentId]) -> Result<BTreeMap<AgentId, AgentSummary>, MngrError> {
        let listed = self.list_all(ErrorBehavior::Continue).await?;
        let wanted: std::collections::BTreeSet<&AgentId> = ids.iter().collect();
        Ok(listed.agents.into_iter().filter(|a| wanted.contains(&a.id)).map(|a| (a.id, a)).collect())
    }

    fn group_by_host(resolved: &BTreeMap<AgentId, AgentSummary>) -> BTreeMap<HostId, Vec<AgentId>> {
        let mut groups: BTreeMap<HostId, Vec<AgentId>> = BTreeMap::new();
        for (id, summary) in resolved {
            groups.entry(summary.host_id).or_default().push(*id);
        }
        groups
    }

    fn provider_for(&self, instance: &ProviderInstanceName) -> Option<&Arc<dyn Provider>> {
        self.providers.get(instance)
    }

    /// `start_agents(ctx, ids, connect?)` (§4.12): group by host, ensure
    /// each host is started, then issue one `start_agents` call per host.
    /// `connect` is left to the caller (the CLI attaches interactively
    /// after this returns successfully).
    pub async fn start_agents(&self, ids: &[AgentId]) -> Result<OpResult<AgentId>, MngrError> {
        let resolved = self.resolve(ids).await?;
        let mut result = OpResult::new();
        self.note_missing(ids, &resolved, &mut result);

        for (host_id, agent_ids) in Self::group_by_host(&resolved) {
            let Some(summary) = resolved.values().find(|s| s.host_id == host_id) else { continue };
            let Some(provider) = self.provider_for(&summary.provider) else {
                for id in &agent_ids {
                    result.push_failed(id.to_string(), format!("unknown provider instance {}", summary.provider));
                }
                continue;
            };

            let online = match self.ensure_online(provider.as_ref(), &host_id).await {
                Ok(online) => online,
                Err(e) => {
                    for id in &agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                    continue;
                }
            };

            match online.start_agents(&agent_ids).await {
                Ok(()) => {
                    for id in agent_ids {
                        result.push_ok(id);
                    }
                }
                Err(e) => {
                    for id in agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                }
            }
        }

        Ok(result)
    }

    /// `stop_agents(ctx, ids)` (§4.12): offline hosts fail the affected
    /// agents with a recoverable per-item error rather than aborting.
    pub async fn stop_agents(&self, ids: &[AgentId]) -> Result<OpResult<AgentId>, MngrError> {
        let resolved = self.resolve(ids).await?;
        let mut result = OpResult::new();
        self.note_missing(ids, &resolved, &mut result);

        for (host_id, agent_ids) in Self::group_by_host(&resolved) {
            let Some(summary) = resolved.values().find(|s| s.host_id == host_id) else { continue };
            let Some(provider) = self.provider_for(&summary.provider) else {
                for id in &agent_ids {
                    result.push_failed(id.to_string(), format!("unknown provider instance {}", summary.provider));
                }
                continue;
            };

            let online = match provider.get_online_host(&host_id).await {
                Ok(online) => online,
                Err(e) => {
                    for id in &agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                    continue;
                }
            };

            match online.stop_agents(&agent_ids).await {
                Ok(()) => {
                    for id in agent_ids {
                        result.push_ok(id);
                    }
                }
                Err(e) => {
                    for id in agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                }
            }
        }

        Ok(result)
    }

    /// `exec_command_on_agents(ctx, ids, command, user?, cwd?, timeout?, ...)`
    /// (§4.12): runs `command` under each agent's work dir (or `cwd` if
    /// given) on its host, one call per agent (providers do not batch
    /// arbitrary shell commands the way they batch start/stop).
    pub async fn exec_command_on_agents(
        &self,
        ids: &[AgentId],
        command: &str,
        user: Option<&str>,
        cwd: Option<&Path>,
        timeout: Option<Duration>,
        error_behavior: ErrorBehavior,
    ) -> Result<OpResult<(AgentId, CommandResult)>, MngrError> {
        let resolved = self.resolve(ids).await?;
        let mut result = OpResult::new();
        self.note_missing(ids, &resolved, &mut result);

        for (host_id, agent_ids) in Self::group_by_host(&resolved) {
            let Some(summary) = resolved.values().find(|s| s.host_id == host_id) else { continue };
            let Some(provider) = self.provider_for(&summary.provider) else {
                for id in &agent_ids {
                    result.push_failed(id.to_string(), format!("unknown provider instance {}", summary.provider));
                }
                continue;
            };

            let online = match provider.get_online_host(&host_id).await {
                Ok(online) => online,
                Err(e) => {
                    if error_behavior == ErrorBehavior::Abort {
                        return Err(e);
                    }
                    for id in &agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                    continue;
                }
            };

            for id in agent_ids {
                match online.execute_command(command, user, cwd, timeout).await {
                    Ok(output) => result.push_ok((id, output)),
                    Err(e) => {
                        if error_behavior == ErrorBehavior::Abort {
                            return Err(e);
                        }
                        result.push_failed(id.to_string(), e.to_string());
                    }
                }
            }
        }

        Ok(result)
    }

    /// `send_message_to_agents` (§4.12): agents in a stopped state fail
    /// individually rather than aborting the batch.
    pub async fn send_message_to_agents(
        &self,
        ids: &[AgentId],
        content: &str,
        error_behavior: ErrorBehavior,
    ) -> Result<OpResult<AgentId>, MngrError> {
        let resolved = self.resolve(ids).await?;
        let mut result = OpResult::new();
        self.note_missing(ids, &resolved, &mut result);

        for (id, summary) in &resolved {
            if summary.state == mngr_core::AgentLifecycleState::Stopped {
                result.push_failed(id.to_string(), "agent is stopped".to_string());
                continue;
            }
            let Some(provider) = self.provider_for(&summary.provider) else {
                result.push_failed(id.to_string(), format!("unknown provider instance {}", summary.provider));
                continue;
            };

            let online = match provider.get_online_host(&summary.host_id).await {
                Ok(online) => online,
                Err(e) => {
                    if error_behavior == ErrorBehavior::Abort {
                        return Err(e);
                    }
                    result.push_failed(id.to_string(), e.to_string());
                    continue;
                }
            };

            let agent = match Self::find_agent(online.as_ref(), id).await {
                Ok(agent) => agent,
                Err(e) => {
                    result.push_failed(id.to_string(), e.to_string());
                    continue;
                }
            };

            match agent.send_message(content).await {
                Ok(()) => result.push_ok(*id),
                Err(e) => {
                    if error_behavior == ErrorBehavior::Abort {
                        return Err(e);
                    }
                    result.push_failed(id.to_string(), e.to_string());
                }
            }
        }

        Ok(result)
    }

    /// Single-agent rename (§4.9): step 1 (the durable record) is the
    /// caller's responsibility via `mngr_store::AgentStore::rename`; this
    /// drives step 2, the multiplexer session rename, once that succeeds.
    pub async fn rename(&self, id: &AgentId, new_name: AgentName) -> Result<(), MngrError> {
        let resolved = self.resolve(std::slice::from_ref(id)).await?;
        let summary = resolved.get(id).ok_or_else(|| MngrError::AgentNotFound { name: id.to_string() })?;
        let provider = self
            .provider_for(&summary.provider)
            .ok_or_else(|| MngrError::Provider { message: format!("unknown provider instance {}", summary.provider) })?;

        let online = provider.get_online_host(&summary.host_id).await?;
        let agent = Self::find_agent(online.as_ref(), id).await?;

        let store = AgentStore::new(self.host_paths(&summary.host_id), *id);
        store.rename(new_name.clone()).map_err(|e| MngrError::Provider { message: e.to_string() })?;
        online.rename_agent_session(agent.as_ref(), &new_name).await
    }

    /// `cleanup(ctx, include, exclude, action, dry_run, error_behavior)`
    /// (§4.12): list, group by host, destroy or stop. `dry_run` returns what
    /// would happen without mutating anything.
    #[allow(clippy::too_many_arguments)]
    pub async fn cleanup(
        &self,
        include_filters: &[Expr],
        exclude_filters: &[Expr],
        action: CleanupAction,
        dry_run: bool,
        error_behavior: ErrorBehavior,
    ) -> Result<OpResult<AgentSummary>, MngrError> {
        let listed = self.list_agents(include_filters, exclude_filters, error_behavior).await?;
        let mut result = OpResult::new();

        if dry_run {
            for agent in listed.agents {
                result.push_ok(agent);
            }
            return Ok(result);
        }

        let mut by_host: BTreeMap<HostId, Vec<AgentSummary>> = BTreeMap::new();
        for agent in listed.agents {
            by_host.entry(agent.host_id).or_default().push(agent);
        }

        for (host_id, agents) in by_host {
            let Some(summary) = agents.first() else { continue };
            let Some(provider) = self.provider_for(&summary.provider) else {
                for agent in agents {
                    result.push_failed(agent.id.to_string(), format!("unknown provider instance {}", summary.provider));
                }
                continue;
            };

            let online = match provider.get_online_host(&host_id).await {
                Ok(online) => online,
                Err(e) => {
                    if error_behavior == ErrorBehavior::Abort {
                        return Err(e);
                    }
                    for agent in agents {
                        result.push_failed(agent.id.to_string(), e.to_string());
                    }
                    continue;
                }
            };

            let ids: Vec<AgentId> = agents.iter().map(|a| a.id).collect();
            let outcome = match action {
                CleanupAction::Stop => online.stop_agents(&ids).await,
                CleanupAction::Destroy => {
                    let mut last = Ok(());
                    for agent in &agents {
                        match Self::find_agent(online.as_ref(), &agent.id).await {
                            Ok(handle) => {
                                if let Err(e) = online.destroy_agent(handle.as_ref()).await {
                                    last = Err(e);
                                }
                            }
                            Err(e) => last = Err(e),
                        }
                    }
                    last
                }
            };

            match outcome {
                Ok(()) => {
                    for agent in agents {
                        result.push_ok(agent);
                    }
                }
                Err(e) => {
                    if error_behavior == ErrorBehavior::Abort {
                        return Err(e);
                    }
                    for agent in agents {
                        result.push_failed(agent.id.to_string(), e.to_string());
                    }
                }
            }
        }

        Ok(result)
    }

    async fn ensure_online(
        &self,
        provider: &dyn Provider,
        host_id: &HostId,
    ) -> Result<Box<dyn mngr_provider::OnlineHostInterface>, MngrError> {
        let host = provider.get_host(host_id).await?;
        if host.get_state().await? == HostState::Running {
            provider.get_online_host(host_id).await
        } else {
            provider.start_host(host_id, None).await
        }
    }

    async fn find_agent(
        host: &dyn mngr_provider::OnlineHostInterface,
        id: &AgentId,
    ) -> Result<Box<dyn mngr_provider::AgentInterface>, MngrError> {
        host.get_agent(id).await
    }

    fn note_missing(&self, ids: &[AgentId], resolved: &BTreeMap<AgentId, AgentSummary>, result: &mut OpResult<AgentId>) {
        for id in ids {
            if !resolved.contains_key(id) {
                result.push_failed(id.to_string(), "agent not found".to_string());
            }
        }
    }
}

/// For tests / host lookups that already know the root.
pub fn host_store(state_root: &Path, host: &HostId) -> HostStore {
    HostStore::new(state_root.join(host.to_string()))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
