// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::{UnixListener, UnixStream};
use std::time::Duration;

use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::ForkResult;

use crate::error::WarmError;
use crate::fd_passing;
use crate::protocol::{self, InvocationPayload, EXPECTED_FD_COUNT};

/// A CLI entry point: takes the invocation's argv (`argv[0]` included) and
/// returns the process exit code.
pub type EntryPoint = fn(Vec<String>) -> i32;

/// Double-fork a detached replacement warm server for `entry_name` and
/// return once it has been parked (§4.3: "IMMEDIATELY forks its own
/// replacement"). The caller continues running in its own process; only the
/// grandchild becomes the new warm server.
pub fn spawn_warm_process(entry_name: &str, entry: EntryPoint, idle_timeout: Duration) -> Result<(), WarmError> {
    // SAFETY: `mngr` entry points call this from a single-threaded process,
    // the one precondition nix's fork() requires of the caller.
    match unsafe { nix::unistd::fork() }.map_err(WarmError::Fork)? {
        ForkResult::Parent { child } => {
            let _ = waitpid(child, None);
            Ok(())
        }
        ForkResult::Child => {
            // SAFETY: still single-threaded; this is the intermediate child
            // of the fork above, forking once more so the grandchild can be
            // reparented to init without ever becoming a zombie.
            match unsafe { nix::unistd::fork() } {
                Ok(ForkResult::Parent { .. }) => unsafe { libc::_exit(0) },
                Ok(ForkResult::Child) => {
                    let _ = nix::unistd::setsid();
                    close_fds_from(3);
                    redirect_stdio_to_devnull();
                    warm_server(entry_name, entry, idle_timeout);
                    unsafe { libc::_exit(0) }
                }
                Err(_) => unsafe { libc::_exit(1) },
            }
        }
    }
}

/// Close every inherited descriptor from `start` up, so the grandchild
/// cannot hold open pipes belonging to its parent's parent (§4.3).
fn close_fds_from(start: RawFd) {
    // SAFETY: sysconf with a well-known name argument, no pointer output.
    let max_fd = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    let max_fd = if max_fd > 0 { max_fd as RawFd } else { 1024 };
    for fd in start..max_fd {
        let _ = nix::unistd::close(fd);
    }
}

fn redirect_stdio_to_devnull() {
    let Ok(devnull) = open("/dev/null", OFlag::O_RDWR, Mode::empty()) else { return };
    for target in 0..=2 {
        // SAFETY: stdio has just been closed by `close_fds_from`'s caller
        // sequencing (0/1/2 are part of the closed range only when start <=
        // 2; here start is 3, so 0/1/2 are still the originals being
        // replaced, which is the intended effect).
        let _ = unsafe { nix::unistd::dup2(devnull, target) };
    }
    if devnull > 2 {
        let _ = nix::unistd::close(devnull);
    }
}

/// Bind the entry point's socket, wait (up to `idle_timeout`) for exactly
/// one client, take over its terminal, run `entry`, and report the exit
/// code back (§4.3).
fn warm_server(entry_name: &str, entry: EntryPoint, idle_timeout: Duration) {
    let path = protocol::socket_path(entry_name);
    let _ = std::fs::remove_file(&path);

    // Exclusive bind: if another successor already owns this path, back off
    // silently and let it keep serving (§4.3).
    let listener = match UnixListener::bind(&path) {
        Ok(l) => l,
        Err(_) => return,
    };

    // SAFETY: installing a raw signal handler; restored to default below
    // once a client's terminal is owned.
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigIgn);
    }

    if !wait_for_readable(listener.as_raw_fd(), idle_timeout) {
        drop(listener);
        let _ = std::fs::remove_file(&path);
        return;
    }

    let conn = match listener.accept() {
        Ok((conn, _addr)) => conn,
        Err(_) => {
            let _ = std::fs::remove_file(&path);
            return;
        }
    };
    drop(listener);

    let mut buf = vec![0u8; 65536];
    let (n, fds) = match fd_passing::recv_fds(conn.as_raw_fd(), &mut buf) {
        Ok(v) => v,
        Err(_) => return,
    };
    if fds.len() < EXPECTED_FD_COUNT {
        return;
    }
    let (stdin_fd, stdout_fd, stderr_fd) = (fds[0], fds[1], fds[2]);

    let mut payload_bytes = buf[..n].to_vec();
    drain_remaining(&conn, &mut payload_bytes);

    // SAFETY: this process has just detached via setsid and closed every fd
    // above 2; it holds no other reference to 0/1/2, so replacing them with
    // the client's descriptors is the sole remaining use of those slots.
    unsafe {
        let _ = nix::unistd::dup2(stdin_fd, 0);
        let _ = nix::unistd::dup2(stdout_fd, 1);
        let _ = nix::unistd::dup2(stderr_fd, 2);
    }
    for fd in [stdin_fd, stdout_fd, stderr_fd] {
        if fd > 2 {
            let _ = nix::unistd::close(fd);
        }
    }

    // Park the next successor only after closing the fds we just received,
    // so it never inherits (and keeps open) the client's pipe ends (§4.3).
    if let Err(err) = spawn_warm_process(entry_name, entry, idle_timeout) {
        tracing::debug!(entry = entry_name, error = %err, "failed to park next warm successor");
    }

    // SAFETY: restoring default SIGINT handling now that a terminal is owned.
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
    }

    let Ok(payload) = serde_json::from_slice::<InvocationPayload>(&payload_bytes) else { return };

    for (key, _) in std::env::vars() {
        std::env::remove_var(key);
    }
    for (key, value) in &payload.env {
        std::env::set_var(key, value);
    }
    let _ = std::env::set_current_dir(&payload.cwd);

    let exit_code = entry(payload.argv);

    let mut conn = conn;
    let _ = conn.write_all(&exit_code.to_be_bytes());
}

fn wait_for_readable(fd: RawFd, timeout: Duration) -> bool {
    let mut pfd = libc::pollfd { fd, events: libc::POLLIN, revents: 0 };
    let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
    // SAFETY: pfd is a single, fully-initialized pollfd valid for the call.
    let rv = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    rv > 0 && pfd.revents & libc::POLLIN != 0
}

fn drain_remaining(conn: &UnixStream, buf: &mut Vec<u8>) {
    let _ = conn.set_nonblocking(true);
    let mut chunk = [0u8; 4096];
    loop {
        match (&*conn).read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
            Err(_) => break,
        }
    }
    let _ = conn.set_nonblocking(false);
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
