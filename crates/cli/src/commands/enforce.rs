// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr enforce` (§6, §4.13).

use clap::Args;
use mngr_core::{CleanupAction, ErrorBehavior, IdleMode};
use mngr_fleet::Fleet;

use crate::config::IdlePolicyConfig;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct EnforceArgs {
    #[arg(long = "provider")]
    pub provider: Vec<String>,

    #[arg(long)]
    pub check_idle: bool,

    #[arg(long)]
    pub check_timeouts: bool,

    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(fleet: &Fleet, policy: &IdlePolicyConfig, args: EnforceArgs) -> Result<(), ExitError> {
    let idle_mode = if args.check_idle { policy.mode } else { IdleMode::Disabled };
    let max_age_seconds = args.check_timeouts.then_some(policy.max_idle_seconds);

    let (decisions, result) = fleet
        .enforce(idle_mode, policy.max_idle_seconds, max_age_seconds, CleanupAction::Stop, args.dry_run, ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;

    for decision in &decisions {
        let idle = decision.idle_seconds.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        let age = decision.age_seconds.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{}: idle={idle}s age={age}s acted={}",
            decision.host_name, decision.acted
        );
    }
    for (name, message) in &result.failed {
        eprintln!("enforce failed for {name}: {message}");
    }

    Ok(())
}
