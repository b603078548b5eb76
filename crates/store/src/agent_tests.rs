// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mngr_core::{AgentId, AgentName, AgentRecord, AgentReported, AgentTypeName, CommandString, HostId};

use super::*;

fn sample_record(id: AgentId) -> AgentRecord {
    let host_id = HostId::derive("local", "h1");
    AgentRecord {
        id,
        name: AgentName::new("a1").expect("name"),
        agent_type: AgentTypeName::new("generic").expect("name"),
        work_dir: "/work/a1".into(),
        create_time: 1_000,
        host_id,
        command: CommandString::new("sleep 3600"),
        cli_args: Vec::new(),
        env_vars: BTreeMap::new(),
        permissions: Vec::new(),
        is_start_on_boot: false,
        initial_message: None,
        resume_message: None,
        message_delay_seconds: 0,
        reported: AgentReported::default(),
        plugin_certified: BTreeMap::new(),
    }
}

#[test]
fn write_record_then_read_record_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let id = AgentId::new();
    let store = AgentStore::new(paths, id);

    let record = sample_record(id);
    store.write_record(&record).expect("write");
    let back = store.read_record().expect("read").expect("present");
    assert_eq!(back.name, record.name);
}

#[test]
fn read_record_returns_none_before_any_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let store = AgentStore::new(paths, AgentId::new());
    assert!(store.read_record().expect("read").is_none());
}

#[test]
fn rename_updates_the_persisted_name_and_returns_the_new_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let id = AgentId::new();
    let store = AgentStore::new(paths, id);
    store.write_record(&sample_record(id)).expect("write");

    let renamed = store.rename(AgentName::new("a2").expect("name")).expect("rename").expect("present");
    assert_eq!(renamed.name.as_str(), "a2");

    let persisted = store.read_record().expect("read").expect("present");
    assert_eq!(persisted.name.as_str(), "a2");
}

#[test]
fn rename_on_an_unknown_agent_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let store = AgentStore::new(paths, AgentId::new());
    assert!(store.rename(AgentName::new("a2").expect("name")).expect("rename").is_none());
}

#[test]
fn activity_mtimes_collects_every_recorded_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let id = AgentId::new();
    let store = AgentStore::new(paths, id);

    store.touch_activity("ssh").expect("touch");
    store.touch_activity("message").expect("touch");

    let mtimes = store.activity_mtimes_ms().expect("mtimes");
    assert_eq!(mtimes.len(), 2);
}

#[test]
fn reported_url_is_trimmed_of_trailing_newline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = HostPaths::new(dir.path());
    let id = AgentId::new();
    std::fs::create_dir_all(paths.agent_reported_dir(&id)).expect("mkdir");
    std::fs::write(paths.agent_reported_url(&id), "https://example.test\n").expect("write");

    let store = AgentStore::new(paths, id);
    assert_eq!(store.reported_url().expect("read"), Some("https://example.test".to_string()));
}
