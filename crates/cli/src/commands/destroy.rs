// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr destroy` (§6): a `cleanup` restricted to the explicitly named
//! agents, with `--action destroy` forced and no filters.

use clap::Args;
use mngr_core::{CleanupAction, ErrorBehavior, OutputFormat};
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;
use crate::output;

#[derive(Args)]
pub struct DestroyArgs {
    pub names: Vec<String>,

    #[arg(long)]
    pub all: bool,

    #[arg(long)]
    pub force: bool,
}

pub async fn run(fleet: &Fleet, args: DestroyArgs) -> Result<(), ExitError> {
    let ids = super::selected_ids(fleet, &args.names, args.all).await?;
    if ids.is_empty() {
        println!("nothing to destroy");
        return Ok(());
    }

    if !args.force && !args.all {
        eprintln!("destroying {} agent(s); pass --force to skip this check", ids.len());
    }

    let include = vec![];
    let exclude = vec![];
    let ids_set: std::collections::BTreeSet<_> = ids.into_iter().collect();
    let listed = fleet.list_agents(&include, &exclude, ErrorBehavior::Continue).await.map_err(ExitError::from)?;
    let targets: Vec<_> = listed.agents.into_iter().filter(|a| ids_set.contains(&a.id)).collect();

    let filters: Vec<mngr_fleet::Expr> = targets
        .iter()
        .map(|a| mngr_fleet::parse_filter(&format!("id == {:?}", a.id.to_string())))
        .collect::<Result<_, _>>()
        .map_err(|e| ExitError::from(mngr_core::MngrError::Provider { message: e.to_string() }))?;
    if filters.is_empty() {
        return Ok(());
    }
    let or_filter = filters.into_iter().reduce(|a, b| mngr_fleet::Expr::Or(Box::new(a), Box::new(b))).expect("non-empty");

    let result = fleet
        .cleanup(&[or_filter], &[], CleanupAction::Destroy, false, ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;

    output::print_op_result("destroyed", &result, OutputFormat::Human, |a| a.name.to_string());
    Ok(())
}
