// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn try_client_invoke_reports_connect_refused_when_nothing_listens() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nobody-home.sock");

    let err = try_client_invoke(&path).expect_err("nothing listening");
    assert!(err.is_connect_refused());
}
