// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr cleanup` (§6, §4.12).

use clap::Args;
use mngr_core::{CleanupAction, ErrorBehavior, OutputFormat};
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct CleanupArgs {
    #[arg(long = "provider")]
    pub provider: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,

    /// Skip the interactive confirmation prompt.
    #[arg(long)]
    pub yes: bool,

    #[arg(long, default_value = "stop", value_parser = crate::cli_enums::parse_cleanup_action)]
    pub action: CleanupAction,
}

pub async fn run(fleet: &Fleet, args: CleanupArgs) -> Result<(), ExitError> {
    let mut include = Vec::new();
    for provider in &args.provider {
        include.push(
            mngr_fleet::parse_filter(&format!("host.provider == {provider:?}"))
                .map_err(|e| ExitError::usage(format!("invalid provider filter: {e}")))?,
        );
    }

    if !args.dry_run && !args.yes {
        eprintln!("pass --yes to confirm cleanup, or --dry-run to preview");
        return Ok(());
    }

    let result = fleet
        .cleanup(&include, &[], args.action, args.dry_run, ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;

    let label = if args.dry_run { "would clean up" } else { "cleaned up" };
    output::print_op_result(label, &result, OutputFormat::Human, |a| a.name.to_string());
    Ok(())
}
