// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mngr-core: value types, identifiers, durable records and the lifecycle
//! rules shared by every other `mngr` crate.

pub mod macros;

pub mod clock;
pub mod enums;
pub mod error;
pub mod host_id;
pub mod id;
pub mod lifecycle;
pub mod names;
pub mod records;

pub use clock::{Clock, FakeClock, SystemClock};
pub use enums::{
    ActivitySource, AgentLifecycleState, CleanupAction, ErrorBehavior, HostState, IdleMode,
    LifecycleHook, LogLevel, OutputFormat, UncommittedChangesMode,
};
pub use error::MngrError;
pub use host_id::HostId;
pub use id::IdBuf;
pub use names::{
    AgentName, AgentTypeName, CommandString, CronSchedule, GitRepoUrl, HostName, ImageReference,
    Permission, PluginName, ProviderBackendName, ProviderInstanceName, SnapshotName,
};
pub use records::{
    AgentId, AgentRecord, AgentReported, CertifiedHostData, HostRecord, SnapshotEntry, SnapshotId,
    StopReason, VolumeId,
};
