// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn user_input_without_help_has_no_hint() {
    let err = MngrError::user_input("bad flag");
    assert_eq!(err.user_help_text(), None);
    assert_eq!(err.recovery(), ErrorRecovery::Immediate);
}

#[test]
fn user_input_with_help_round_trips() {
    let err = MngrError::user_input_with_help("bad flag", "try --help");
    assert_eq!(err.user_help_text(), Some("try --help"));
}

#[test]
fn not_found_errors_are_per_item() {
    assert_eq!(MngrError::HostNotFound { name: "h1".into() }.recovery(), ErrorRecovery::PerItem);
    assert_eq!(MngrError::AgentNotFound { name: "a1".into() }.recovery(), ErrorRecovery::PerItem);
}

#[test]
fn capability_errors_are_capability_recovery() {
    assert_eq!(MngrError::SnapshotsNotSupported.recovery(), ErrorRecovery::Capability);
    assert_eq!(
        MngrError::NotSupported { what: "volumes" }.recovery(),
        ErrorRecovery::Capability
    );
}

#[test]
fn name_conflict_is_never_recovered() {
    assert_eq!(
        MngrError::HostNameConflict { name: "h1".into() }.recovery(),
        ErrorRecovery::Immediate
    );
}

#[test]
fn nested_tmux_carries_actionable_hint() {
    let err = MngrError::NestedTmux;
    assert!(err.user_help_text().is_some());
}

#[test]
fn display_messages_are_human_readable() {
    let err = MngrError::HostNotFound { name: "missing-host".into() };
    assert_eq!(err.to_string(), "host \"missing-host\" not found");
}
