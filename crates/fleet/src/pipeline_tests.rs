// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use mngr_core::AgentId;

use super::*;

#[tokio::test]
async fn empty_fleet_lists_no_agents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let result = fleet.list_agents(&[], &[], ErrorBehavior::Continue).await.expect("list_agents");
    assert!(result.agents.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn start_agents_reports_missing_ids_as_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let missing = AgentId::new();
    let result = fleet.start_agents(&[missing]).await.expect("start_agents");
    assert!(result.successful.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].0, missing.to_string());
}

#[test]
fn note_missing_flags_only_ids_absent_from_resolved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fleet = Fleet::new(ProviderMap::new(), dir.path());
    let present = AgentId::new();
    let missing = AgentId::new();
    let mut resolved: BTreeMap<AgentId, AgentSummary> = BTreeMap::new();
    resolved.insert(
        present,
        AgentSummary {
            id: present,
            name: mngr_core::AgentName::new("a1").expect("name"),
            agent_type: mngr_core::AgentTypeName::new("generic").expect("name"),
            state: mngr_core::AgentLifecycleState::Running,
            host_id: mngr_core::HostId::derive("local", "h1"),
            host_name: mngr_core::HostName::new("h1").expect("name"),
            host_state: mngr_core::HostState::Running,
            provider: mngr_core::ProviderInstanceName::new("local").expect("name"),
            host_tags: BTreeMap::new(),
            age_seconds: 0,
            idle_seconds: None,
        },
    );

    let mut result = OpResult::new();
    fleet.note_missing(&[present, missing], &resolved, &mut result);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].0, missing.to_string());
}
