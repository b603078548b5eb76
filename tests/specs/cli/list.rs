// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr list` against a fresh, agent-free local provider.

use crate::support::Workspace;

#[test]
fn list_on_empty_fleet_reports_no_agents() {
    let workspace = Workspace::new();
    workspace.cli().args(["list"]).passes().stdout_has("No agents found.");
}

#[test]
fn list_json_on_empty_fleet_is_an_empty_array() {
    let workspace = Workspace::new();
    let assert = workspace.cli().args(["list", "--format", "json"]).passes();
    let doc: serde_json::Value = serde_json::from_str(&assert.stdout()).expect("valid json");
    assert_eq!(doc["agents"].as_array().expect("agents array").len(), 0);
}

#[test]
fn list_rejects_unknown_format() {
    let workspace = Workspace::new();
    workspace.cli().args(["list", "--format", "xml"]).fails_with(2);
}
