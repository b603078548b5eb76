// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup: `EnvFilter` plus a compact formatter to
//! stderr, file output best-effort under the config directory. Mirrors the
//! daemon-side setup other `tracing`-using components in this stack use,
//! adapted for a short-lived CLI process (no rotation, no guard kept past
//! `main`'s own scope since there is no background task to outlive it).

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Returns the `WorkerGuard` the caller must keep alive for the process
/// lifetime (dropping it flushes the non-blocking file writer).
pub fn init(log_dir: &Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "mngr.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Some(guard)
}
