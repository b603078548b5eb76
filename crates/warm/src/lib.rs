// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warm-successor bootstrap (§4.3): each CLI entry point keeps one
//! pre-initialized successor process parked on a Unix domain socket so the
//! next invocation of that entry point can hand its terminal over instead of
//! paying process startup cost.

mod client;
mod error;
mod fd_passing;
mod protocol;
mod server;

pub use error::WarmError;
pub use protocol::{socket_path, InvocationPayload, DEFAULT_IDLE_TIMEOUT, EXPECTED_FD_COUNT};
pub use server::{spawn_warm_process, EntryPoint};

use std::time::Duration;

/// Run `entry_name`'s CLI through the warm-successor protocol.
///
/// Tries to hand the invocation off to an already-listening successor first;
/// falls back to running `entry` in this process and then parking a fresh
/// successor behind it (the "cold path", §4.3).
pub fn run_warm_cli(entry_name: &str, entry: EntryPoint, idle_timeout: Duration) -> i32 {
    let path = protocol::socket_path(entry_name);

    match client::try_client_invoke(&path) {
        Ok(code) => return code,
        Err(err) if err.is_connect_refused() => {}
        Err(err) => {
            tracing::debug!(entry = entry_name, error = %err, "warm client invoke failed, falling back to cold start");
        }
    }

    let argv: Vec<String> = std::env::args().collect();
    let code = entry(argv);

    if let Err(err) = server::spawn_warm_process(entry_name, entry, idle_timeout) {
        tracing::debug!(entry = entry_name, error = %err, "failed to park warm successor");
    }

    code
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
