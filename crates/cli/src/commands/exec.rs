// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr exec` (§6, §4.12): runs one shell command against each selected
//! agent's host.

use clap::Args;
use mngr_core::ErrorBehavior;
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ExecArgs {
    pub names: Vec<String>,

    #[arg(long)]
    pub all: bool,

    #[arg(last = true)]
    pub cmd: Vec<String>,
}

pub async fn run(fleet: &Fleet, args: ExecArgs) -> Result<(), ExitError> {
    if args.cmd.is_empty() {
        return Err(ExitError::usage("expected a trailing command after --"));
    }
    let ids = super::selected_ids(fleet, &args.names, args.all).await?;
    let command = args.cmd.join(" ");

    let result = fleet
        .exec_command_on_agents(&ids, &command, None, None, None, ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;

    for (id, output) in &result.successful {
        println!("--- {id} ---");
        print!("{}", output.stdout);
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
    }
    for (name, message) in &result.failed {
        eprintln!("exec failed for {name}: {message}");
    }
    Ok(())
}
