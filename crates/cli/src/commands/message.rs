// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr message` (§6, §4.12).

use clap::Args;
use mngr_core::{ErrorBehavior, OutputFormat};
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct MessageArgs {
    pub names: Vec<String>,

    #[arg(long)]
    pub all: bool,

    /// Message text. A flag rather than a second variadic positional, since
    /// clap cannot split two unbounded positionals unambiguously.
    #[arg(short = 'm', long = "content")]
    pub content: String,
}

pub async fn run(fleet: &Fleet, args: MessageArgs) -> Result<(), ExitError> {
    let ids = super::selected_ids(fleet, &args.names, args.all).await?;
    let result = fleet.send_message_to_agents(&ids, &args.content, ErrorBehavior::Continue).await.map_err(ExitError::from)?;
    output::print_op_result("messaged", &result, OutputFormat::Human, |id| id.to_string());
    Ok(())
}
