// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn idle_mode_default_is_disabled() {
    assert_eq!(IdleMode::default(), IdleMode::Disabled);
}

#[test]
fn error_behavior_default_is_continue() {
    assert_eq!(ErrorBehavior::default(), ErrorBehavior::Continue);
}

#[test]
fn host_state_display_matches_screaming_snake_case() {
    assert_eq!(HostState::Running.to_string(), "RUNNING");
    assert_eq!(HostState::Destroyed.to_string(), "DESTROYED");
}

#[test]
fn agent_lifecycle_state_serde_round_trip() {
    for state in [
        AgentLifecycleState::Running,
        AgentLifecycleState::Waiting,
        AgentLifecycleState::Stopped,
        AgentLifecycleState::Done,
        AgentLifecycleState::Replaced,
    ] {
        let json = serde_json::to_string(&state).expect("serialize");
        let back: AgentLifecycleState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state);
    }
}

#[test]
fn idle_mode_serde_uses_snake_case() {
    let json = serde_json::to_string(&IdleMode::AllAgentsIdle).expect("serialize");
    assert_eq!(json, "\"all_agents_idle\"");
}

#[test]
fn lifecycle_hook_display_matches_hookspec_names() {
    assert_eq!(LifecycleHook::OnBeforeCommand.to_string(), "on_before_command");
}
