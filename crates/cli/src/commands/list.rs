// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr list` (§6).

use clap::Args;
use mngr_core::{ErrorBehavior, OutputFormat};
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct ListArgs {
    /// Restrict to one or more provider instances.
    #[arg(long = "provider")]
    pub provider: Vec<String>,

    /// Include filter expression (ANDed across repetitions).
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Exclude filter expression (ORed across repetitions).
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    #[arg(long, default_value = "human", value_parser = crate::cli_enums::parse_output_format)]
    pub format: OutputFormat,
}

pub async fn run(fleet: &Fleet, args: ListArgs) -> Result<(), ExitError> {
    let mut include = super::parse_filters(&args.include)?;
    let exclude = super::parse_filters(&args.exclude)?;

    for provider in &args.provider {
        include.push(
            mngr_fleet::parse_filter(&format!("host.provider == {provider:?}"))
                .map_err(|e| ExitError::usage(format!("invalid provider filter: {e}")))?,
        );
    }

    let result = fleet.list_agents(&include, &exclude, ErrorBehavior::Continue).await.map_err(ExitError::from)?;
    output::print_agent_list(&result.agents, &result.errors, args.format);
    Ok(())
}
