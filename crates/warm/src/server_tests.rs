// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::net::{UnixListener, UnixStream};
use std::time::Instant;

use super::*;

#[test]
fn wait_for_readable_times_out_when_nobody_connects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let listener = UnixListener::bind(dir.path().join("idle.sock")).expect("bind");

    let start = Instant::now();
    let got = wait_for_readable(listener.as_raw_fd(), Duration::from_millis(50));
    assert!(!got);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn wait_for_readable_returns_true_once_a_client_connects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("busy.sock");
    let listener = UnixListener::bind(&path).expect("bind");

    let connect_path = path.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        let _ = UnixStream::connect(&connect_path);
    });

    let got = wait_for_readable(listener.as_raw_fd(), Duration::from_secs(2));
    assert!(got);
}

#[test]
fn close_fds_from_beyond_the_open_range_is_a_noop() {
    close_fds_from(10_000);
}
