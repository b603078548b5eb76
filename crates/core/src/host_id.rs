// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host identifiers.
//!
//! Providers without a strong identifier of their own (local, SSH) derive a
//! `HostId` deterministically from `(provider_instance_name, host_name)` so
//! that the same name under the same provider instance always yields the
//! same id across processes. Providers with their own identifiers (container,
//! serverless) assign the id themselves and are responsible for persisting
//! the name-to-id mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace UUID for deterministic host-id derivation, matching the
/// namespace name `"mngr-host"` hashed into a UUIDv5 namespace of its own
/// (there is no well-known namespace for this, so we derive one from the
/// DNS namespace the way `uuid` expects callers to mint private namespaces).
const HOST_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6d, 0x6e, 0x67, 0x72, 0x2d, 0x68, 0x6f, 0x73, 0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
]);

/// Opaque host identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(Uuid);

impl HostId {
    /// Derive the deterministic id for a provider without strong identifiers.
    pub fn derive(provider_instance_name: &str, host_name: &str) -> Self {
        let key = format!("{provider_instance_name}/{host_name}");
        Self(Uuid::new_v5(&HOST_NAMESPACE, key.as_bytes()))
    }

    /// Wrap a provider-assigned id verbatim (container/serverless providers).
    pub fn from_provider_id(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HostId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
#[path = "host_id_tests.rs"]
mod tests;
