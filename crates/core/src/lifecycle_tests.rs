// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn offline_host_forces_stopped_regardless_of_markers() {
    let signals = AgentStateSignals {
        host_online: false,
        session_exists: true,
        waiting_marker: true,
        done_marker: true,
        replaced_marker: true,
    };
    assert_eq!(derive_agent_state(signals), AgentLifecycleState::Stopped);
}

#[test]
fn replaced_marker_wins_over_done_and_waiting() {
    let signals = AgentStateSignals {
        host_online: true,
        session_exists: false,
        waiting_marker: true,
        done_marker: true,
        replaced_marker: true,
    };
    assert_eq!(derive_agent_state(signals), AgentLifecycleState::Replaced);
}

#[test]
fn running_session_with_no_markers_is_running() {
    let signals = AgentStateSignals { host_online: true, session_exists: true, ..Default::default() };
    assert_eq!(derive_agent_state(signals), AgentLifecycleState::Running);
}

#[test]
fn no_session_no_markers_is_stopped() {
    let signals = AgentStateSignals { host_online: true, ..Default::default() };
    assert_eq!(derive_agent_state(signals), AgentLifecycleState::Stopped);
}

#[test]
fn derive_agent_state_is_pure() {
    let signals = AgentStateSignals { host_online: true, waiting_marker: true, ..Default::default() };
    assert_eq!(derive_agent_state(signals), derive_agent_state(signals));
}

#[test]
fn gone_from_provider_wins_over_everything() {
    let signals = HostStateSignals {
        gone_from_provider: true,
        stop_reason: StopReason::Paused,
        ssh_accepting: true,
        data_json_readable: true,
        ..Default::default()
    };
    assert_eq!(derive_host_state(signals), HostState::Destroyed);
}

#[test]
fn stop_reason_paused_maps_to_paused_state() {
    let signals = HostStateSignals { stop_reason: StopReason::Paused, ..Default::default() };
    assert_eq!(derive_host_state(signals), HostState::Paused);
}

#[test]
fn ssh_accepting_and_data_readable_is_running() {
    let signals = HostStateSignals { ssh_accepting: true, data_json_readable: true, ..Default::default() };
    assert_eq!(derive_host_state(signals), HostState::Running);
}

#[test]
fn building_flag_overrides_partial_connectivity() {
    let signals = HostStateSignals { provider_building: true, ssh_accepting: true, ..Default::default() };
    assert_eq!(derive_host_state(signals), HostState::Building);
}

#[test]
fn compute_idle_seconds_empty_set_is_none() {
    assert_eq!(compute_idle_seconds(&[], 10_000), None);
}

#[test]
fn compute_idle_seconds_uses_most_recent_mtime() {
    let now_ms = 100_000;
    let mtimes = [now_ms - 30_000, now_ms - 5_000, now_ms - 60_000];
    assert_eq!(compute_idle_seconds(&mtimes, now_ms), Some(5));
}

#[test]
fn compute_idle_seconds_respects_threshold_inequality() {
    let now_ms = 100_000;
    let threshold_secs = 10;
    let idle_mtimes = [now_ms - 10_000];
    let idle = compute_idle_seconds(&idle_mtimes, now_ms).expect("some");
    assert!(idle >= threshold_secs);

    let fresh_mtimes = [now_ms - 9_000];
    let fresh = compute_idle_seconds(&fresh_mtimes, now_ms).expect("some");
    assert!(fresh < threshold_secs);
}
