// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mngr-provider: the backend-agnostic host/agent contract (C6-C11) and its
//! four concrete backends (local, SSH, container, serverless).
//!
//! Every trait method here returns `mngr_core::MngrError` directly rather
//! than a parallel provider-specific error enum: that taxonomy already names
//! every domain error a provider can raise (`HostNotFound`, `Provider`, the
//! capability-gated `NotSupported`/`SnapshotsNotSupported`, ...), and its own
//! doc comment scopes it as covering "domain errors... recognized across the
//! whole manager". A backend-local failure (an SSH handshake error, a `kube`
//! API error) is wrapped into `MngrError::Provider` at the point it crosses
//! into this contract.

pub mod agent;
pub mod agent_type;
pub mod capability;
pub mod contract;
pub mod providers;
pub mod ssh_setup;
pub mod workdir;

pub use agent::TmuxAgentInterface;
pub use agent_type::{resolve_agent_type, AgentTypeDef, AgentTypeRegistry};
pub use capability::Capabilities;
pub use contract::{
    AgentCreateOptions, AgentInterface, CommandResult, HostInterface, HostResources,
    OnlineHostInterface, Provider, WorkDirCopyStrategy,
};
pub use providers::container::ContainerProvider;
pub use providers::local::LocalProvider;
pub use providers::serverless::{ServerlessProvider, ServerlessProviderConfig};
pub use providers::ssh::{SshProvider, SshProviderConfig};
