// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations (§6).

pub mod cleanup;
pub mod config_cmd;
pub mod connect;
pub mod create;
pub mod destroy;
pub mod enforce;
pub mod exec;
pub mod list;
pub mod logs;
pub mod message;
pub mod rename;
pub mod start;
pub mod stop;

use mngr_core::AgentId;
use mngr_fleet::Fleet;

use crate::exit_error::ExitError;

/// Resolves human-facing agent names to ids by listing the whole fleet once.
/// Every subcommand that targets agents by name (`start`/`stop`/`destroy`/
/// `exec`/`message`/`rename`) goes through this before calling into
/// `mngr-fleet`, whose batch operations all key on [`AgentId`].
pub(crate) async fn resolve_names(fleet: &Fleet, names: &[String]) -> Result<Vec<AgentId>, ExitError> {
    let listed = fleet
        .list_agents(&[], &[], mngr_core::ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;

    let mut ids = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match listed.agents.iter().find(|a| a.name.as_str() == name) {
            Some(agent) => ids.push(agent.id),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(ExitError::from(mngr_core::MngrError::AgentNotFound { name: missing.join(", ") }));
    }
    Ok(ids)
}

/// `--all` resolves to every agent the fleet currently knows about.
pub(crate) async fn resolve_all(fleet: &Fleet) -> Result<Vec<AgentId>, ExitError> {
    let listed = fleet
        .list_agents(&[], &[], mngr_core::ErrorBehavior::Continue)
        .await
        .map_err(ExitError::from)?;
    Ok(listed.agents.iter().map(|a| a.id).collect())
}

/// Shared `NAME… | --all` selection, used by every batch mutating command.
pub(crate) async fn selected_ids(fleet: &Fleet, names: &[String], all: bool) -> Result<Vec<AgentId>, ExitError> {
    if all {
        if !names.is_empty() {
            return Err(ExitError::usage("cannot combine explicit names with --all"));
        }
        resolve_all(fleet).await
    } else {
        if names.is_empty() {
            return Err(ExitError::usage("expected one or more NAME arguments, or --all"));
        }
        resolve_names(fleet, names).await
    }
}

pub(crate) fn parse_filters(raw: &[String]) -> Result<Vec<mngr_fleet::Expr>, ExitError> {
    raw.iter()
        .map(|src| mngr_fleet::parse_filter(src).map_err(|e| ExitError::usage(format!("invalid filter {src:?}: {e}"))))
        .collect()
}
