// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help and usage output.

use crate::support::cli;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    cli().fails_with(2).stderr_has("Usage:");
}

#[test]
fn help_shows_usage() {
    cli().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn help_lists_every_subcommand() {
    let assert = cli().args(["--help"]).passes();
    let stdout = assert.stdout();
    for name in ["list", "create", "destroy", "start", "stop", "connect", "exec", "rename", "message", "logs", "cleanup", "enforce", "config"] {
        assert!(stdout.contains(name), "--help missing subcommand {name:?}:\n{stdout}");
    }
}

#[test]
fn version_shows_version() {
    cli().args(["--version"]).passes().stdout_has("0.2");
}

#[test]
fn list_help_shows_usage() {
    cli().args(["list", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    cli().args(["frobnicate"]).fails_with(2).stderr_has("Usage:");
}
