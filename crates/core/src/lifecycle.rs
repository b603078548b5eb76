// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure derivation rules for agent and host state (§4.6, §4.7).
//!
//! Nothing here touches disk or the clock directly; callers (`mngr-store`,
//! `mngr-provider`) gather the signals and pass them in, which keeps these
//! functions trivially testable and keeps the five-state / six-state
//! invariant in one place.

use crate::enums::{AgentLifecycleState, HostState};
use crate::records::StopReason;

/// The signals `derive_agent_state` needs, gathered by the caller from the
/// host's multiplexer and the agent's `reported/` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentStateSignals {
    /// Whether the owning host is currently reachable. Per §4.6, an agent on
    /// an offline host always reports STOPPED regardless of any marker.
    pub host_online: bool,
    /// Whether the agent's multiplexer session currently exists on the host.
    pub session_exists: bool,
    /// `reported/status.md` (or equivalent waiting-for-input marker) present.
    pub waiting_marker: bool,
    /// A completion marker has been written.
    pub done_marker: bool,
    /// A different agent has taken over this logical role.
    pub replaced_marker: bool,
}

/// Derive an agent's lifecycle state from a snapshot of signals. Pure: the
/// same signals always produce the same state.
pub fn derive_agent_state(signals: AgentStateSignals) -> AgentLifecycleState {
    if !signals.host_online {
        return AgentLifecycleState::Stopped;
    }
    if signals.replaced_marker {
        return AgentLifecycleState::Replaced;
    }
    if signals.done_marker {
        return AgentLifecycleState::Done;
    }
    if signals.waiting_marker {
        return AgentLifecycleState::Waiting;
    }
    if signals.session_exists {
        return AgentLifecycleState::Running;
    }
    AgentLifecycleState::Stopped
}

/// The signals `derive_host_state` needs, gathered by the caller from the
/// provider and the on-host state store.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostStateSignals {
    /// The record still exists but the provider reports the host gone.
    pub gone_from_provider: bool,
    pub stop_reason: StopReason,
    /// The provider is still constructing the host; no connectivity yet.
    pub provider_building: bool,
    /// SSH is accepting connections (banner observed).
    pub ssh_accepting: bool,
    /// `data.json` is readable on the host-managed volume.
    pub data_json_readable: bool,
}

/// Derive a host's state from a snapshot of signals. Pure, same contract as
/// [`derive_agent_state`].
pub fn derive_host_state(signals: HostStateSignals) -> HostState {
    if signals.gone_from_provider {
        return HostState::Destroyed;
    }
    match signals.stop_reason {
        StopReason::Paused => return HostState::Paused,
        StopReason::Stopped => return HostState::Stopped,
        StopReason::None => {}
    }
    if signals.provider_building {
        return HostState::Building;
    }
    if signals.ssh_accepting && signals.data_json_readable {
        return HostState::Running;
    }
    HostState::Starting
}

/// Seconds elapsed since the most recently touched file in a set of
/// activity-file mtimes, or `None` if the set is empty (no signal at all).
///
/// Used by both `IdleMode::AnySource` (pass every source, host and agent
/// alike) and `IdleMode::AllAgentsIdle` (pass only agent sources) — the two
/// modes differ only in which mtimes the caller selects, not in how
/// idleness is computed from them.
pub fn compute_idle_seconds(mtimes_ms: &[u64], now_ms: u64) -> Option<u64> {
    mtimes_ms.iter().copied().max().map(|most_recent| now_ms.saturating_sub(most_recent) / 1000)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
