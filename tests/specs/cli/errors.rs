// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain errors surface as exit code 1 (§7); missing/contradictory
//! arguments surface as exit code 2, matching clap's own usage errors.

use crate::support::Workspace;

#[test]
fn start_unknown_agent_name_is_exit_one() {
    let workspace = Workspace::new();
    workspace
        .cli()
        .args(["start", "does-not-exist"])
        .fails_with(1)
        .stderr_has("does-not-exist");
}

#[test]
fn stop_with_no_names_and_no_all_is_a_usage_error() {
    let workspace = Workspace::new();
    workspace.cli().args(["stop"]).fails_with(2);
}

#[test]
fn destroy_combining_names_and_all_is_a_usage_error() {
    let workspace = Workspace::new();
    workspace.cli().args(["destroy", "--all", "whatever"]).fails_with(2);
}

#[test]
fn exec_rejects_malformed_filter_like_argument() {
    let workspace = Workspace::new();
    workspace
        .cli()
        .args(["list", "--include", "nonsense((("])
        .fails_with(2)
        .stderr_has("invalid filter");
}

#[test]
fn cleanup_without_yes_or_dry_run_refuses_to_act() {
    let workspace = Workspace::new();
    workspace.cli().args(["cleanup"]).passes().stderr_has("--yes");
}
