// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn shell_quote_escapes_embedded_single_quotes() {
    assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
}

#[test]
fn shell_quote_leaves_plain_paths_alone() {
    assert_eq!(shell_quote("/var/lib/mngr/host/abc"), "'/var/lib/mngr/host/abc'");
}

#[test]
fn command_result_check_ok_passes_through_zero_exit() {
    let result = CommandResult { stdout: String::new(), stderr: String::new(), returncode: Some(0) };
    assert!(result.check_ok().is_ok());
}

#[test]
fn command_result_check_ok_surfaces_stderr_on_failure() {
    let result = CommandResult { stdout: String::new(), stderr: "boom".to_string(), returncode: Some(1) };
    let err = result.check_ok().unwrap_err();
    assert!(matches!(err, MngrError::Provider { message } if message == "boom"));
}
