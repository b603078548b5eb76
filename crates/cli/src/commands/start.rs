// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr start` (§6, §4.12).

use clap::Args;
use mngr_core::OutputFormat;
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct StartArgs {
    pub names: Vec<String>,

    #[arg(long)]
    pub all: bool,

    /// Attach to the first started agent once the batch completes.
    #[arg(long)]
    pub connect: bool,
}

pub async fn run(fleet: &Fleet, prefix: &str, args: StartArgs) -> Result<(), ExitError> {
    let ids = super::selected_ids(fleet, &args.names, args.all).await?;
    let result = fleet.start_agents(&ids).await.map_err(ExitError::from)?;
    output::print_op_result("started", &result, OutputFormat::Human, |id| id.to_string());

    if args.connect {
        if let Some(id) = result.successful.first() {
            let listed = fleet.list_agents(&[], &[], mngr_core::ErrorBehavior::Continue).await.map_err(ExitError::from)?;
            if let Some(agent) = listed.agents.iter().find(|a| a.id == *id) {
                super::connect::attach_session(&format!("{prefix}{}", agent.name)).map_err(ExitError::from)?;
            }
        }
    }

    Ok(())
}
