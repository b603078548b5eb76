// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mngr_core::AgentId;
use mngr_store::{AgentStore, HostPaths};

use super::*;

#[test]
fn disabled_idle_mode_never_reports_idle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let host_id = mngr_core::HostId::derive("local", "h1");
    let idle = fleet.host_idle_seconds(&host_id, &[], IdleMode::Disabled, 10_000);
    assert_eq!(idle, None);
}

#[test]
fn any_source_idle_uses_the_most_recent_signal_across_agents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let host_id = mngr_core::HostId::derive("local", "h1");
    let host_dir = dir.path().join(host_id.to_string());
    std::fs::create_dir_all(&host_dir).expect("mkdir");

    let agent_a = AgentId::new();
    let agent_b = AgentId::new();
    let store_a = AgentStore::new(HostPaths::new(&host_dir), agent_a);
    let store_b = AgentStore::new(HostPaths::new(&host_dir), agent_b);
    store_a.touch_activity("agent_message").expect("touch");
    store_b.touch_activity("agent_message").expect("touch");

    let now_ms = mngr_core::SystemClock.epoch_ms();
    let idle = fleet
        .host_idle_seconds(&host_id, &[agent_a, agent_b], IdleMode::AnySource, now_ms + 5_000)
        .expect("idle computed");
    assert_eq!(idle, 5);
}

#[test]
fn all_agents_idle_requires_at_least_one_agent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let host_id = mngr_core::HostId::derive("local", "h1");
    let idle = fleet.host_idle_seconds(&host_id, &[], IdleMode::AllAgentsIdle, 10_000);
    assert_eq!(idle, None);
}
