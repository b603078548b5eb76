// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr stop` (§6, §4.12).

use clap::Args;
use mngr_core::OutputFormat;
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct StopArgs {
    pub names: Vec<String>,

    #[arg(long)]
    pub all: bool,
}

pub async fn run(fleet: &Fleet, args: StopArgs) -> Result<(), ExitError> {
    let ids = super::selected_ids(fleet, &args.names, args.all).await?;
    let result = fleet.stop_agents(&ids).await.map_err(ExitError::from)?;
    output::print_op_result("stopped", &result, OutputFormat::Human, |id| id.to_string());
    Ok(())
}
