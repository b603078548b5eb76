// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle/timeout enforcement (C13, §4.13): walk every host this fleet knows
//! about, decide whether it has gone idle under the configured
//! [`IdleMode`], and apply the configured [`CleanupAction`] to the ones
//! that have.
//!
//! Unlike the C12 operations, policy here (`idle_mode`, `max_idle_seconds`)
//! is not read from a stored host field — it is supplied by the caller at
//! invocation time, the same way `mngr cleanup`'s filters are. A daemon or
//! cron job wanting periodic enforcement re-supplies the same policy on
//! every call.

use mngr_core::{Clock, HostState, IdleMode, MngrError, SystemClock};
use mngr_store::{AgentStore, HostPaths, HostStore};

use crate::model::OpResult;
use crate::pipeline::{Fleet, ListResult};

/// One host's enforcement outcome, returned alongside the [`OpResult`] so
/// callers can report what was inspected even when nothing was idle.
#[derive(Debug, Clone)]
pub struct EnforceDecision {
    pub host_id: mngr_core::HostId,
    pub host_name: mngr_core::HostName,
    pub idle_seconds: Option<u64>,
    pub age_seconds: Option<u64>,
    pub acted: bool,
}

impl Fleet {
    /// `enforce(ctx, idle_mode, max_idle_seconds, max_age_seconds, action,
    /// dry_run, error_behavior)` (§4.13). Hosts already stopped or destroyed
    /// are skipped. `idle_mode == Disabled` turns off idle checking; passing
    /// `max_age_seconds = None` turns off the absolute-age cap
    /// (`check_timeouts`). Both checks run independently and either one
    /// acting is enough to enforce the host — a host can be well within its
    /// idle budget and still get cut off by the age cap. `dry_run` still
    /// computes and returns every [`EnforceDecision`] but skips the
    /// mutating call, the same contract `cleanup`'s `dry_run` has.
    pub async fn enforce(
        &self,
        idle_mode: IdleMode,
        max_idle_seconds: u64,
        max_age_seconds: Option<u64>,
        action: mngr_core::CleanupAction,
        dry_run: bool,
        error_behavior: mngr_core::ErrorBehavior,
    ) -> Result<(Vec<EnforceDecision>, OpResult<mngr_core::AgentId>), MngrError> {
        let mut decisions = Vec::new();
        let mut result = OpResult::new();

        if idle_mode == IdleMode::Disabled && max_age_seconds.is_none() {
            return Ok((decisions, result));
        }

        let listed: ListResult = self.list_agents(&[], &[], error_behavior).await?;
        let now_ms = SystemClock.epoch_ms();

        let mut by_host: std::collections::BTreeMap<
            mngr_core::HostId,
            (mngr_core::HostName, mngr_core::ProviderInstanceName, mngr_core::HostState, Vec<mngr_core::AgentId>, u64),
        > = std::collections::BTreeMap::new();
        for agent in &listed.agents {
            let entry = by_host
                .entry(agent.host_id)
                .or_insert_with(|| (agent.host_name.clone(), agent.provider.clone(), agent.host_state, Vec::new(), 0));
            entry.3.push(agent.id);
            entry.4 = entry.4.max(agent.age_seconds);
        }

        for (host_id, (host_name, provider_name, host_state, agent_ids, oldest_agent_seconds)) in by_host {
            if host_state != HostState::Running {
                continue;
            }

            let idle_seconds = if idle_mode == IdleMode::Disabled {
                None
            } else {
                self.host_idle_seconds(&host_id, &agent_ids, idle_mode, now_ms)
            };
            let idle_expired = idle_mode != IdleMode::Disabled
                && idle_seconds.map(|idle| idle >= max_idle_seconds).unwrap_or(false);
            let age_expired = max_age_seconds.is_some_and(|cap| oldest_agent_seconds >= cap);
            let should_act = idle_expired || age_expired;

            decisions.push(EnforceDecision {
                host_id,
                host_name,
                idle_seconds,
                age_seconds: Some(oldest_agent_seconds),
                acted: should_act,
            });

            if !should_act || dry_run {
                continue;
            }

            let Some(provider) = self.providers().get(&provider_name) else {
                for id in &agent_ids {
                    result.push_failed(id.to_string(), format!("unknown provider instance {provider_name}"));
                }
                continue;
            };

            let outcome = match action {
                mngr_core::CleanupAction::Stop => match provider.get_online_host(&host_id).await {
                    Ok(online) => online.stop_agents(&agent_ids).await,
                    Err(e) => Err(e),
                },
                mngr_core::CleanupAction::Destroy => provider.destroy_host(&host_id).await,
            };

            match outcome {
                Ok(()) => {
                    for id in agent_ids {
                        result.push_ok(id);
                    }
                }
                Err(e) => {
                    if error_behavior == mngr_core::ErrorBehavior::Abort {
                        return Err(e);
                    }
                    for id in agent_ids {
                        result.push_failed(id.to_string(), e.to_string());
                    }
                }
            }
        }

        Ok((decisions, result))
    }

    /// AnySource: idle iff the most-recently-touched signal (SSH plus every
    /// agent's own activity sources combined) is older than the threshold.
    /// AllAgentsIdle: idle iff every agent (and there is at least one) is
    /// individually past the threshold.
    fn host_idle_seconds(
        &self,
        host_id: &mngr_core::HostId,
        agent_ids: &[mngr_core::AgentId],
        idle_mode: IdleMode,
        now_ms: u64,
    ) -> Option<u64> {
        let paths = HostPaths::new(self.state_root().join(host_id.to_string()));
        let host_store = HostStore::new(paths.root());

        match idle_mode {
            IdleMode::Disabled => None,
            IdleMode::AnySource => {
                let mut mtimes = Vec::new();
                if let Ok(Some(ssh_mtime)) = host_store.ssh_activity_mtime_ms() {
                    mtimes.push(ssh_mtime);
                }
                for id in agent_ids {
                    let store = AgentStore::new(HostPaths::new(paths.root()), *id);
                    if let Ok(agent_mtimes) = store.activity_mtimes_ms() {
                        mtimes.extend(agent_mtimes);
                    }
                }
                mngr_core::lifecycle::compute_idle_seconds(&mtimes, now_ms)
            }
            IdleMode::AllAgentsIdle => {
                if agent_ids.is_empty() {
                    return None;
                }
                let mut max_idle = 0u64;
                for id in agent_ids {
                    let store = AgentStore::new(HostPaths::new(paths.root()), *id);
                    let mtimes = store.activity_mtimes_ms().ok()?;
                    let idle = mngr_core::lifecycle::compute_idle_seconds(&mtimes, now_ms)?;
                    max_idle = max_idle.max(idle);
                }
                Some(max_idle)
            }
        }
    }
}

#[cfg(test)]
#[path = "enforce_tests.rs"]
mod tests;
