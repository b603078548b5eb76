// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr config show|path`: a missing `config.toml` falls back to defaults
//! rather than erroring.

use crate::support::Workspace;

#[test]
fn config_path_points_inside_the_workspace() {
    let workspace = Workspace::new();
    let assert = workspace.cli().args(["config", "path"]).passes();
    assert!(assert.stdout().trim().ends_with("config.toml"));
}

#[test]
fn config_show_defaults_when_no_file_present() {
    let workspace = Workspace::new();
    workspace
        .cli()
        .args(["config", "show"])
        .passes()
        .stdout_has("prefix")
        .stdout_has("mngr-");
}

#[test]
fn config_show_reflects_written_file() {
    let workspace = Workspace::new();
    workspace.write_config(
        r#"
prefix = "myfleet-"

[idle]
mode = "any_source"
max_idle_seconds = 120
"#,
    );

    workspace
        .cli()
        .args(["config", "show"])
        .passes()
        .stdout_has("myfleet-")
        .stdout_has("120");
}

#[test]
fn config_show_rejects_malformed_toml() {
    let workspace = Workspace::new();
    workspace.write_config("prefix = [this is not valid toml");

    workspace.cli().args(["config", "show"]).fails_with(1);
}
