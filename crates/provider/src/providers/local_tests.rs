// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mngr_core::{AgentTypeName, CommandString, HostState, ProviderInstanceName};

use super::*;
use crate::contract::AgentCreateOptions;

fn provider(root: &std::path::Path) -> LocalProvider {
    LocalProvider::new(ProviderInstanceName::new("local").expect("name"), root)
}

fn create_options(name: &str) -> AgentCreateOptions {
    AgentCreateOptions {
        name: AgentName::new(name).expect("name"),
        agent_type: AgentTypeName::new("generic").expect("name"),
        command: CommandString::new("bash"),
        cli_args: Vec::new(),
        env_vars: BTreeMap::new(),
        permissions: Vec::new(),
        is_start_on_boot: false,
        initial_message: None,
        resume_message: None,
        message_delay_seconds: 0,
    }
}

#[tokio::test]
async fn create_host_then_get_host_round_trips_the_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");

    let fetched = provider.get_host(&host.get_id()).await.expect("get");
    assert_eq!(fetched.get_name().as_str(), "h1");
}

#[tokio::test]
async fn creating_a_host_with_a_name_already_in_use_conflicts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let name = HostName::new("h1").expect("name");
    provider
        .create_host(name.clone(), None, BTreeMap::new(), BTreeMap::new(), BTreeMap::new(), Vec::new(), Vec::new(), None)
        .await
        .expect("first create");

    let err = provider
        .create_host(name, None, BTreeMap::new(), BTreeMap::new(), BTreeMap::new(), Vec::new(), Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MngrError::HostNameConflict { .. }));
}

#[tokio::test]
async fn stop_host_then_start_host_round_trips_stop_reason() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");
    let id = host.get_id();

    provider.stop_host(&id, false, Duration::from_secs(1)).await.expect("stop");
    let err = provider.stop_host(&id, false, Duration::from_secs(1)).await;
    assert!(err.is_ok(), "stopping an already-stopped host is idempotent in this backend");

    let restarted = provider.start_host(&id, None).await.expect("start");
    assert_eq!(restarted.get_state().await.expect("state"), HostState::Running);
}

#[tokio::test]
async fn starting_a_host_that_was_never_stopped_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");

    let err = provider.start_host(&host.get_id(), None).await.unwrap_err();
    assert!(matches!(err, MngrError::HostNotStopped { .. }));
}

#[tokio::test]
async fn destroy_host_removes_it_from_subsequent_lookups() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");
    let id = host.get_id();

    provider.destroy_host(&id).await.expect("destroy");
    let err = provider.get_host(&id).await.unwrap_err();
    assert!(matches!(err, MngrError::HostNotFound { .. }));
}

#[tokio::test]
async fn list_hosts_finds_every_created_host() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    for name in ["h1", "h2"] {
        provider
            .create_host(
                HostName::new(name).expect("name"),
                None,
                BTreeMap::new(),
                BTreeMap::new(),
                BTreeMap::new(),
                Vec::new(),
                Vec::new(),
                None,
            )
            .await
            .expect("create");
    }

    let mut names: Vec<String> = provider.list_hosts(false).await.into_iter().map(|h| h.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["h1".to_string(), "h2".to_string()]);
}

#[tokio::test]
async fn create_agent_state_rejects_a_duplicate_name_on_the_same_host() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");

    let work_dir = dir.path().join("work");
    host.create_agent_state(&work_dir, create_options("worker")).await.expect("first");
    let err = host.create_agent_state(&work_dir, create_options("worker")).await.unwrap_err();
    assert!(matches!(err, MngrError::HostNameConflict { .. }));
}

#[tokio::test]
async fn set_env_vars_then_get_certified_data_reflects_env_through_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = provider(dir.path());
    let host = provider
        .create_host(
            HostName::new("h1").expect("name"),
            None,
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
        .await
        .expect("create");

    let mut env = BTreeMap::new();
    env.insert("FOO".to_string(), "bar".to_string());
    host.set_env_vars(&env).await.expect("set env");

    let certified = host.get_certified_data().await.expect("certified");
    assert_eq!(certified.host_name.as_str(), "h1");
}
