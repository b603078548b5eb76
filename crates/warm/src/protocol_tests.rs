// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn socket_path_is_stable_for_the_same_entry_and_namespaced_by_uid() {
    let a = socket_path("mngr.echo_command");
    let b = socket_path("mngr.echo_command");
    assert_eq!(a, b);
    assert!(a.to_string_lossy().contains(&nix::unistd::Uid::current().as_raw().to_string()));
}

#[test]
fn socket_path_sanitizes_characters_outside_the_safe_set() {
    let path = socket_path("mngr cli/echo command");
    let name = path.file_name().expect("file name").to_string_lossy().into_owned();
    assert!(!name.contains(' '));
    assert!(!name.contains('/'));
}

#[test]
fn invocation_payload_round_trips_through_json() {
    let payload = InvocationPayload {
        argv: vec!["mngr".to_string(), "list".to_string()],
        env: [("MNGR_ROOT_NAME".to_string(), "mngr".to_string())].into_iter().collect(),
        cwd: "/tmp".to_string(),
    };
    let json = serde_json::to_vec(&payload).expect("serialize");
    let back: InvocationPayload = serde_json::from_slice(&json).expect("deserialize");
    assert_eq!(back.argv, payload.argv);
    assert_eq!(back.cwd, payload.cwd);
}
