// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable records (§3, §4.4, §4.5).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::host_id::HostId;
use crate::names::{AgentTypeName, HostName, ImageReference, PluginName};

crate::define_id! {
    /// Randomly generated, globally unique agent identifier.
    pub struct AgentId("agt-");
}

/// Opaque identifier assigned by a backing provider. The core never
/// interprets its contents, only stores and compares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

/// Opaque identifier assigned by a backing provider for a persistent volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeId(String);

macro_rules! opaque_provider_id {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_provider_id!(SnapshotId);
opaque_provider_id!(VolumeId);

/// Why a host is not running, if it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StopReason {
    #[default]
    None,
    Paused,
    Stopped,
}

crate::simple_display! {
    StopReason {
        None => "NONE",
        Paused => "PAUSED",
        Stopped => "STOPPED",
    }
}

/// A single entry in a host's snapshot history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: SnapshotId,
    pub name: crate::names::SnapshotName,
    pub created_at: u64,
}

/// The durable, manager-written record of a host. Never touched by the
/// agent process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertifiedHostData {
    pub host_id: HostId,
    pub host_name: HostName,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(default)]
    pub user_tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
    #[serde(default)]
    pub stop_reason: StopReason,
    #[serde(default)]
    pub snapshots: Vec<SnapshotEntry>,
}

impl CertifiedHostData {
    pub fn new(host_id: HostId, host_name: HostName, now_ms: u64) -> Self {
        Self {
            host_id,
            host_name,
            created_at: now_ms,
            updated_at: now_ms,
            user_tags: BTreeMap::new(),
            image: None,
            stop_reason: StopReason::None,
            snapshots: Vec::new(),
        }
    }

    /// Record an orphan-free snapshot entry and bump `updated_at`.
    pub fn push_snapshot(&mut self, entry: SnapshotEntry, now_ms: u64) {
        self.snapshots.push(entry);
        self.updated_at = now_ms;
    }
}

/// `CertifiedHostData` plus the connectivity fields needed to reconnect to
/// (or restart) an online host. For a host that failed to finish coming up,
/// the connectivity fields may be `None`, but `certified` is always
/// complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(flatten)]
    pub certified: CertifiedHostData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_host_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// The raw arguments this host was started with, kept so the host can
    /// be restarted identically later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl HostRecord {
    pub fn is_online(&self) -> bool {
        self.ssh_host.is_some() && self.container_id.is_some()
    }
}

/// Fields written by the agent itself about itself; the manager reads them
/// but never alters them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReported {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_url: Option<String>,
    /// RFC3339 timestamp, stored verbatim as written by the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_status_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_status_html: Option<String>,
}

/// The durable record of an agent (§3, §4.5). Only the fields the manager
/// itself writes live here; `reported` mirrors files the agent writes and
/// `activity/<source>` mtimes (read separately by `mngr-store`) are the
/// authoritative liveness signal, not a field on this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: crate::names::AgentName,
    #[serde(rename = "type")]
    pub agent_type: AgentTypeName,
    pub work_dir: PathBuf,
    pub create_time: u64,
    pub host_id: HostId,

    pub command: crate::names::CommandString,
    #[serde(default)]
    pub cli_args: Vec<String>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub permissions: Vec<crate::names::Permission>,
    #[serde(default)]
    pub is_start_on_boot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_message: Option<String>,
    #[serde(default)]
    pub message_delay_seconds: u64,

    #[serde(default)]
    pub reported: AgentReported,

    /// Certified scratch data, keyed by plugin name. The reported
    /// counterpart lives under `reported/plugin/<plugin>/…` on disk and is
    /// opaque to the core.
    #[serde(default)]
    pub plugin_certified: BTreeMap<PluginName, serde_json::Value>,
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
