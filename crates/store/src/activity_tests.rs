// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn touch_creates_a_file_whose_mtime_is_readable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("activity").join("ssh");

    touch(&path).expect("touch");
    let ms = mtime_ms(&path).expect("mtime").expect("should exist");
    assert!(ms > 0);
}

#[test]
fn touch_never_decreases_mtime_on_repeated_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ssh");

    touch(&path).expect("touch 1");
    let first = mtime_ms(&path).expect("mtime").expect("exists");

    std::thread::sleep(std::time::Duration::from_millis(10));
    touch(&path).expect("touch 2");
    let second = mtime_ms(&path).expect("mtime").expect("exists");

    assert!(second >= first);
}

#[test]
fn mtime_ms_returns_none_for_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nope");
    assert_eq!(mtime_ms(&path).expect("mtime"), None);
}

#[test]
fn list_sources_lists_every_file_in_the_activity_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let activity_dir = dir.path().join("activity");
    touch(&activity_dir.join("ssh")).expect("touch ssh");
    touch(&activity_dir.join("message")).expect("touch message");

    let mut sources = list_sources(&activity_dir).expect("list");
    sources.sort();
    assert_eq!(sources, vec!["message".to_string(), "ssh".to_string()]);
}
