// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr connect` (§6): attaches to an agent's tmux session and translates
//! the on-host signal file the multiplexer key binding writes on disconnect
//! into the reserved exit codes 10 (destroy) / 11 (stop), per the
//! interactive-disconnect protocol.

use std::path::Path;

use clap::Args;
use mngr_core::MngrError;
use mngr_fleet::Fleet;
use mngr_store::HostPaths;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ConnectArgs {
    pub name: String,
}

pub async fn run(fleet: &Fleet, state_root: &Path, prefix: &str, args: ConnectArgs) -> Result<i32, ExitError> {
    let listed = fleet.list_agents(&[], &[], mngr_core::ErrorBehavior::Continue).await.map_err(ExitError::from)?;
    let agent = listed
        .agents
        .iter()
        .find(|a| a.name.as_str() == args.name)
        .ok_or_else(|| ExitError::from(MngrError::AgentNotFound { name: args.name.clone() }))?;

    let session = format!("{prefix}{}", agent.name);
    attach_session(&session).map_err(ExitError::from)?;

    let paths = HostPaths::new(state_root.join(agent.host_id.to_string()));
    let signal_path = paths.signal_file(&session);
    match std::fs::read_to_string(&signal_path) {
        Ok(content) => {
            let _ = std::fs::remove_file(&signal_path);
            match content.trim() {
                "destroy" => Ok(10),
                "stop" => Ok(11),
                _ => Ok(0),
            }
        }
        Err(_) => Ok(0),
    }
}

/// Runs `tmux attach-session`, inheriting this process's stdio, and blocks
/// until the user detaches or the session ends. Only a failure to spawn
/// `tmux` itself is an error; the session's own exit status (which reflects
/// whatever ran inside it, not the attach itself) is not.
pub fn attach_session(session: &str) -> Result<(), MngrError> {
    std::process::Command::new("tmux")
        .args(["attach-session", "-t", session])
        .status()
        .map(|_| ())
        .map_err(|e| MngrError::Provider { message: format!("failed to spawn tmux: {e}") })
}
