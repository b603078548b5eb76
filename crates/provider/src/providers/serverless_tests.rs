// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exec_request_serializes_with_sandbox_id_and_command() {
    let request = ExecRequest { sandbox_id: "sb-1", command: "echo hi" };
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["sandbox_id"], "sb-1");
    assert_eq!(value["command"], "echo hi");
}

#[test]
fn exec_response_deserializes_exit_code_as_optional() {
    let value = serde_json::json!({"stdout": "ok", "stderr": "", "exit_code": null});
    let response: ExecResponse = serde_json::from_value(value).expect("deserialize");
    assert_eq!(response.exit_code, None);
}

#[test]
fn capabilities_mark_serverless_as_the_only_snapshotting_backend() {
    assert!(Capabilities::serverless().supports_snapshots);
}
