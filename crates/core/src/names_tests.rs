// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepts_valid_slug() {
    assert!(AgentName::new("my-agent_01.v2").is_ok());
}

#[test]
fn rejects_empty() {
    assert_eq!(AgentName::new(""), Err(NameError::Empty { field: "AgentName" }));
}

#[test]
fn rejects_invalid_chars() {
    assert!(matches!(HostName::new("bad name"), Err(NameError::InvalidChars { .. })));
    assert!(matches!(HostName::new("bad/name"), Err(NameError::InvalidChars { .. })));
}

#[test]
fn display_round_trips() {
    let name = AgentName::new("agent-1").expect("valid");
    assert_eq!(name.to_string(), "agent-1");
}

#[test]
fn serde_round_trip() {
    let name = SnapshotName::new("snap-1").expect("valid");
    let json = serde_json::to_string(&name).expect("serialize");
    assert_eq!(json, "\"snap-1\"");
    let back: SnapshotName = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, name);
}

#[test]
fn serde_rejects_invalid() {
    let err = serde_json::from_str::<AgentName>("\"bad name\"");
    assert!(err.is_err());
}

#[test]
fn opaque_types_store_verbatim() {
    let cmd = CommandString::from("echo 'hi there'  && exit");
    assert_eq!(cmd.as_str(), "echo 'hi there'  && exit");
}
