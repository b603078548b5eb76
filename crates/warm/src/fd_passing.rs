// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM_RIGHTS file-descriptor passing over a Unix domain socket. The stdlib
//! has no portable wrapper for ancillary data, so this goes through `nix`'s
//! `sendmsg`/`recvmsg` directly (grounded on the raw-socket style the pack
//! uses for other low-level process bootstrap code).

use std::io::{IoSlice, IoSliceMut};
use std::os::fd::RawFd;

use nix::cmsg_space;
use nix::sys::socket::{recvmsg, sendmsg, ControlMessage, ControlMessageOwned, MsgFlags};

/// Send `data` plus `fds` (exactly [`crate::EXPECTED_FD_COUNT`] of them) in
/// one `sendmsg` call.
pub fn send_fds(sock_fd: RawFd, fds: &[RawFd], data: &[u8]) -> nix::Result<usize> {
    let iov = [IoSlice::new(data)];
    let cmsgs = [ControlMessage::ScmRights(fds)];
    sendmsg::<()>(sock_fd, &iov, &cmsgs, MsgFlags::empty(), None)
}

/// Receive up to three passed file descriptors and whatever payload bytes
/// arrived with them into `buf`. Returns the number of bytes read and the
/// received descriptors, in send order.
pub fn recv_fds(sock_fd: RawFd, buf: &mut [u8]) -> nix::Result<(usize, Vec<RawFd>)> {
    let mut iov = [IoSliceMut::new(buf)];
    let mut cmsg_buffer = cmsg_space!([RawFd; 3]);
    let msg = recvmsg::<()>(sock_fd, &mut iov, Some(&mut cmsg_buffer), MsgFlags::empty())?;

    let mut fds = Vec::new();
    for cmsg in msg.cmsgs()? {
        if let ControlMessageOwned::ScmRights(received) = cmsg {
            fds.extend(received);
        }
    }
    Ok((msg.bytes, fds))
}

#[cfg(test)]
#[path = "fd_passing_tests.rs"]
mod tests;
