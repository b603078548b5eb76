// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::names::{AgentName, CommandString, HostName};
use std::path::PathBuf;

fn sample_host_record() -> HostRecord {
    let host_id = HostId::derive("local", "box-a");
    let mut certified = CertifiedHostData::new(host_id, HostName::new("box-a").expect("valid"), 1_000);
    certified.push_snapshot(
        SnapshotEntry {
            id: SnapshotId::new("snap-abc"),
            name: crate::names::SnapshotName::new("nightly").expect("valid"),
            created_at: 2_000,
        },
        2_000,
    );
    HostRecord {
        certified,
        ssh_host: Some("10.0.0.1".to_string()),
        ssh_port: Some(22),
        ssh_host_public_key: Some("ssh-ed25519 AAAA".to_string()),
        container_id: Some("ctr-1".to_string()),
        config: None,
    }
}

fn sample_agent_record() -> AgentRecord {
    AgentRecord {
        id: AgentId::new(),
        name: AgentName::new("a1").expect("valid"),
        agent_type: AgentTypeName::new("generic").expect("valid"),
        work_dir: PathBuf::from("/work/a1"),
        create_time: 1_000,
        host_id: HostId::derive("local", "box-a"),
        command: CommandString::from("sleep 3600"),
        cli_args: vec![],
        env_vars: BTreeMap::new(),
        permissions: vec![],
        is_start_on_boot: false,
        initial_message: None,
        resume_message: Some("resume please".to_string()),
        message_delay_seconds: 0,
        reported: AgentReported::default(),
        plugin_certified: BTreeMap::new(),
    }
}

#[test]
fn host_record_round_trips_through_json() {
    let record = sample_host_record();
    let json = serde_json::to_string(&record).expect("serialize");
    let back: HostRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(record, back);
}

#[test]
fn host_record_is_online_requires_ssh_and_container() {
    let mut record = sample_host_record();
    assert!(record.is_online());
    record.container_id = None;
    assert!(!record.is_online());
}

#[test]
fn agent_record_round_trips_through_json() {
    let record = sample_agent_record();
    let json = serde_json::to_string(&record).expect("serialize");
    let back: AgentRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(record, back);
}

#[test]
fn agent_record_type_field_renames_to_type_in_json() {
    let record = sample_agent_record();
    let json = serde_json::to_value(&record).expect("serialize");
    assert!(json.get("type").is_some());
    assert!(json.get("agent_type").is_none());
}

#[test]
fn snapshot_ids_are_stored_verbatim() {
    let id = SnapshotId::new("provider-assigned-123");
    assert_eq!(id.as_str(), "provider-assigned-123");
    assert_eq!(id.to_string(), "provider-assigned-123");
}
