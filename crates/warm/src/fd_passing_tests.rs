// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

use super::*;

#[test]
fn send_fds_then_recv_fds_round_trips_payload_and_descriptors() {
    let (a, b) = UnixStream::pair().expect("socketpair");

    let devnull_a = std::fs::File::open("/dev/null").expect("open devnull");
    let devnull_b = std::fs::File::open("/dev/null").expect("open devnull");
    let devnull_c = std::fs::File::open("/dev/null").expect("open devnull");
    let passed = [devnull_a.as_raw_fd(), devnull_b.as_raw_fd(), devnull_c.as_raw_fd()];

    let payload = b"hello";
    send_fds(a.as_raw_fd(), &passed, payload).expect("send_fds");

    let mut buf = [0u8; 64];
    let (n, fds) = recv_fds(b.as_raw_fd(), &mut buf).expect("recv_fds");

    assert_eq!(&buf[..n], payload);
    assert_eq!(fds.len(), 3);
    for fd in fds {
        nix::unistd::close(fd).expect("close received fd");
    }
}
