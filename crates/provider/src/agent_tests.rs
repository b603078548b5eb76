// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mngr_core::{AgentId, AgentName, AgentTypeName, CommandString};

use super::*;
use crate::agent_type::AgentTypeDef;

struct FakeExecutor {
    calls: Arc<AtomicUsize>,
    fail_first_n: usize,
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn run(&self, _command: &str) -> Result<bool, MngrError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(call >= self.fail_first_n)
    }
}

fn interface(fail_first_n: usize) -> TmuxAgentInterface<FakeExecutor> {
    TmuxAgentInterface::new(
        AgentId::new(),
        AgentName::new("worker").expect("name"),
        "mngr-".to_string(),
        AgentTypeName::new("generic").expect("name"),
        FakeExecutor { calls: Arc::new(AtomicUsize::new(0)), fail_first_n },
    )
}

#[tokio::test]
async fn send_message_succeeds_on_first_attempt() {
    let agent = interface(0);
    agent.send_message("hello").await.expect("send");
}

#[tokio::test]
async fn send_message_retries_once_after_a_transient_failure() {
    let agent = interface(1);
    agent.send_message("hello").await.expect("send should succeed after one retry");
}

#[tokio::test]
async fn send_message_gives_up_after_the_retry_budget_is_exhausted() {
    let agent = interface(100);
    let err = agent.send_message("hello").await.unwrap_err();
    assert!(matches!(err, MngrError::Provider { .. }));
}

#[test]
fn session_name_is_prefix_plus_agent_name() {
    let agent = interface(0);
    assert_eq!(agent.session_name(), "mngr-worker");
}

#[test]
fn assemble_command_returns_override_verbatim_when_given() {
    let agent = interface(0);
    let registry = AgentTypeRegistry::new();
    let cmd = agent.assemble_command(&registry, &[], Some("custom --flag")).expect("assemble");
    assert_eq!(cmd, "custom --flag");
}

#[test]
fn assemble_command_resolves_agent_type_and_appends_extra_args() {
    let agent = interface(0);
    let mut registry = AgentTypeRegistry::new();
    registry.register(AgentTypeDef {
        name: AgentTypeName::new("generic").expect("name"),
        parent_type: None,
        command: Some(CommandString::new("claude")),
        cli_args: vec!["--base".to_string()],
        permissions: Vec::new(),
    });

    let cmd = agent.assemble_command(&registry, &["--resume".to_string()], None).expect("assemble");
    assert_eq!(cmd, "claude --base --resume");
}

#[test]
fn assemble_command_fails_when_agent_type_is_unregistered() {
    let agent = interface(0);
    let registry = AgentTypeRegistry::new();
    let err = agent.assemble_command(&registry, &[], None).unwrap_err();
    assert!(matches!(err, MngrError::ConfigParse { .. }));
}
