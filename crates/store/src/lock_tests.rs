// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn try_acquire_returns_none_while_another_handle_holds_the_lock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".lock");

    let first = HostLock::try_acquire(&path).expect("first acquire").expect("should acquire");
    let second = HostLock::try_acquire(&path).expect("second acquire attempt");
    assert!(second.is_none());

    drop(first);
    let third = HostLock::try_acquire(&path).expect("third acquire attempt");
    assert!(third.is_some());
}

#[test]
fn acquire_creates_the_lock_files_parent_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join(".lock");

    let _lock = HostLock::acquire(&path).expect("acquire");
    assert!(path.exists());
}
