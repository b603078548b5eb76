// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr logs` (§6): reads a file out of an agent's work dir through its
//! host's `execute_command` channel. `--follow` is a polling loop rather
//! than a true stream — `execute_command` returns a completed result, not a
//! handle to a running process, so there is no generic way across backends
//! to attach to an open file descriptor.

use std::time::Duration;

use clap::Args;
use mngr_core::MngrError;
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct LogsArgs {
    pub target: String,

    #[arg(default_value = "agent.log")]
    pub file: String,

    #[arg(long)]
    pub follow: bool,

    #[arg(long)]
    pub tail: Option<usize>,

    #[arg(long)]
    pub head: Option<usize>,
}

pub async fn run(fleet: &Fleet, providers: &mngr_fleet::ProviderMap, args: LogsArgs) -> Result<(), ExitError> {
    let listed = fleet.list_agents(&[], &[], mngr_core::ErrorBehavior::Continue).await.map_err(ExitError::from)?;
    let agent = listed
        .agents
        .iter()
        .find(|a| a.name.as_str() == args.target)
        .ok_or_else(|| ExitError::from(MngrError::AgentNotFound { name: args.target.clone() }))?;

    let provider = providers
        .get(&agent.provider)
        .ok_or_else(|| ExitError::from(MngrError::Provider { message: format!("unknown provider instance {}", agent.provider) }))?;
    let online = provider.get_online_host(&agent.host_id).await.map_err(ExitError::from)?;

    let read_cmd = match (args.tail, args.head) {
        (Some(n), _) => format!("tail -n {n} {}", args.file),
        (None, Some(n)) => format!("head -n {n} {}", args.file),
        (None, None) => format!("cat {}", args.file),
    };

    if !args.follow {
        let output = online.execute_command(&read_cmd, None, None, None).await.map_err(ExitError::from)?;
        print!("{}", output.stdout);
        return Ok(());
    }

    let mut last = String::new();
    loop {
        let output = online.execute_command(&read_cmd, None, None, None).await.map_err(ExitError::from)?;
        if output.stdout != last {
            print!("{}", &output.stdout[last.len().min(output.stdout.len())..]);
            last = output.stdout;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
