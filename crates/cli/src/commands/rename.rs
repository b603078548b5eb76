// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr rename` (§6, §4.9).

use clap::Args;
use mngr_core::{AgentName, MngrError};
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct RenameArgs {
    pub current: String,
    pub new: String,
}

pub async fn run(fleet: &Fleet, args: RenameArgs) -> Result<(), ExitError> {
    let ids = super::resolve_names(fleet, std::slice::from_ref(&args.current)).await?;
    let id = ids.first().copied().ok_or_else(|| ExitError::from(MngrError::AgentNotFound { name: args.current.clone() }))?;
    let new_name = AgentName::new(&args.new).map_err(|e| ExitError::usage(e.to_string()))?;
    fleet.rename(&id, new_name).await.map_err(ExitError::from)?;
    println!("renamed {} to {}", args.current, args.new);
    Ok(())
}
