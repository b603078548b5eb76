// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr create` (§6, §4.8): provisions a new host named after the agent
//! and a single agent on it. One host per agent keeps the provider-keyed
//! naming (`HostId::derive(provider, name)` for local/ssh, a fresh id for
//! container/serverless) simple and matches how each backend already keys
//! its host directory by name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use mngr_core::{AgentName, AgentTypeName, CommandString, HostName};
use mngr_provider::contract::{AgentCreateOptions, ProvisionCtx, WorkDirCopyStrategy, WorkDirOptions};
use mngr_provider::Provider;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CreateArgs {
    /// Name for both the new host and its one agent.
    pub name: String,

    /// Agent type (looked up in the agent-type registry).
    #[arg(default_value = "default")]
    pub agent_type: String,

    /// Provider instance to create the host under.
    #[arg(long = "in", default_value = "local")]
    pub provider: String,

    /// Source tree to copy into the agent's work dir (defaults to cwd).
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Skip attaching interactively once the agent is running.
    #[arg(long)]
    pub no_connect: bool,

    /// Block until the agent reports itself ready before returning.
    #[arg(long)]
    pub await_ready: bool,

    /// Command to run in the agent's session; resolved from the agent type
    /// when omitted.
    #[arg(last = true)]
    pub cmd: Vec<String>,
}

pub async fn run(providers: &mngr_fleet::ProviderMap, prefix: &str, args: CreateArgs) -> Result<(), ExitError> {
    let host_name = HostName::new(&args.name).map_err(|e| ExitError::usage(e.to_string()))?;
    let agent_name = AgentName::new(&args.name).map_err(|e| ExitError::usage(e.to_string()))?;
    let agent_type = AgentTypeName::new(&args.agent_type).map_err(|e| ExitError::usage(e.to_string()))?;

    let provider_name = mngr_core::ProviderInstanceName::new(&args.provider).map_err(|e| ExitError::usage(e.to_string()))?;
    let provider = providers
        .get(&provider_name)
        .ok_or_else(|| ExitError::usage(format!("unknown provider instance {:?}", args.provider)))?;

    let online = provider
        .create_host(host_name, None, BTreeMap::new(), BTreeMap::new(), BTreeMap::new(), Vec::new(), Vec::new(), None)
        .await
        .map_err(ExitError::from)?;

    let source_path = args.source.clone().unwrap_or_else(|| PathBuf::from("."));
    let work_dir_options = WorkDirOptions {
        strategy: WorkDirCopyStrategy::FullCopy,
        include_git_dir: false,
        uncommitted_changes_mode: mngr_core::UncommittedChangesMode::Fail,
    };
    let work_dir = online
        .create_agent_work_dir(None, &source_path, &work_dir_options)
        .await
        .map_err(ExitError::from)?;

    if args.cmd.is_empty() && args.source.is_none() {
        return Err(ExitError::usage("either a trailing CMD or --source must be given"));
    }

    let command = CommandString::from(args.cmd.join(" "));
    let create_options = AgentCreateOptions {
        name: agent_name,
        agent_type,
        command,
        cli_args: Vec::new(),
        env_vars: BTreeMap::new(),
        permissions: Vec::new(),
        is_start_on_boot: true,
        initial_message: None,
        resume_message: None,
        message_delay_seconds: 0,
    };
    let agent = online.create_agent_state(&work_dir, create_options).await.map_err(ExitError::from)?;

    let ctx = ProvisionCtx { host_dir: work_dir.clone(), work_dir: work_dir.clone(), timeout: None };
    online.provision_agent(agent.as_ref(), &ctx).await.map_err(ExitError::from)?;

    online.start_agents(&[*agent.id()]).await.map_err(ExitError::from)?;

    if args.await_ready {
        tracing::info!(agent = %agent.name(), "awaiting readiness is not yet signalled generically; proceeding");
    }

    println!("created agent {} on host {}", agent.name(), args.name);

    if !args.no_connect {
        super::connect::attach_session(&format!("{prefix}{}", args.name)).map_err(ExitError::from)?;
    }

    Ok(())
}
