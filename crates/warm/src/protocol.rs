// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of file descriptors (stdin, stdout, stderr) passed with every
/// invocation (§4.3, §6 wire protocol #1).
pub const EXPECTED_FD_COUNT: usize = 3;

/// Idle timeout a warm successor waits before giving up and exiting
/// unaccepted (§4.3: "configurable idle timeout (default 3600 s)").
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// The JSON payload sent alongside the three passed file descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationPayload {
    pub argv: Vec<String>,
    pub env: HashMap<String, String>,
    pub cwd: String,
}

impl InvocationPayload {
    /// Capture the current process's argv/env/cwd for handoff to a warm
    /// successor.
    pub fn capture() -> std::io::Result<Self> {
        Ok(Self {
            argv: std::env::args().collect(),
            env: std::env::vars().collect(),
            cwd: std::env::current_dir()?.display().to_string(),
        })
    }
}

/// Canonical socket path for `entry_name`, namespaced by uid so that two
/// users on one host never contend for the same successor (§6: "namespaced
/// by (module.function, uid)").
pub fn socket_path(entry_name: &str) -> PathBuf {
    let uid = nix::unistd::Uid::current().as_raw();
    let sanitized: String = entry_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' { c } else { '_' })
        .collect();
    std::env::temp_dir().join(format!("mngr_warm_{sanitized}_{uid}.sock"))
}
