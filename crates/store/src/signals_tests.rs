// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_signal_then_read_signal_consumes_it_exactly_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("signals").join("session-1");

    write_signal(&path, Signal::Destroy).expect("write");
    assert_eq!(read_signal(&path).expect("read"), Some(Signal::Destroy));
    assert_eq!(read_signal(&path).expect("read"), None);
}

#[test]
fn read_signal_returns_none_when_no_file_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nope");
    assert_eq!(read_signal(&path).expect("read"), None);
}

#[test]
fn read_signal_treats_unrecognized_content_as_no_signal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("signals").join("session-2");
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, "garbage").expect("write");

    assert_eq!(read_signal(&path).expect("read"), None);
    assert!(!path.exists());
}

#[test]
fn stop_round_trips_distinctly_from_destroy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session-3");

    write_signal(&path, Signal::Stop).expect("write");
    assert_eq!(read_signal(&path).expect("read"), Some(Signal::Stop));
}
