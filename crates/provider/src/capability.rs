// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What a provider backend can and cannot do (§4.10). Generic fleet code
//! checks these flags and degrades a request to a no-op rather than failing
//! the whole pipeline (`MngrError::recovery() == ErrorRecovery::Capability`).

/// Capability flags for one provider instance. Every backend returns a fixed
/// value; these never change at runtime for a given backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_snapshots: bool,
    pub supports_volumes: bool,
    pub supports_mutable_tags: bool,
    pub supports_shutdown_hosts: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            supports_snapshots: false,
            supports_volumes: false,
            supports_mutable_tags: false,
            supports_shutdown_hosts: false,
        }
    }

    /// The local backend: one process tree, no snapshots, no volumes, tags
    /// are just a JSON file so they're always mutable, and "shutdown" just
    /// means killing the process group.
    pub const fn local() -> Self {
        Self {
            supports_snapshots: false,
            supports_volumes: false,
            supports_mutable_tags: true,
            supports_shutdown_hosts: true,
        }
    }

    /// SSH: a fixed remote machine we don't own the lifecycle of. Tags are a
    /// file on the remote, mutable; there is nothing to snapshot or shut down.
    pub const fn ssh() -> Self {
        Self {
            supports_snapshots: false,
            supports_volumes: false,
            supports_mutable_tags: true,
            supports_shutdown_hosts: false,
        }
    }

    /// Container backends typically offer volumes and full lifecycle control
    /// but snapshotting a running container is backend-specific; conservative
    /// default is "no" unless a concrete backend overrides it.
    pub const fn container() -> Self {
        Self {
            supports_snapshots: false,
            supports_volumes: true,
            supports_mutable_tags: true,
            supports_shutdown_hosts: true,
        }
    }

    /// Serverless: the platform owns the container lifecycle end to end,
    /// including snapshotting its filesystem, but there is no persistent
    /// volume and nothing to "shut down" independent of the platform's own
    /// scale-to-zero.
    pub const fn serverless() -> Self {
        Self {
            supports_snapshots: true,
            supports_volumes: false,
            supports_mutable_tags: true,
            supports_shutdown_hosts: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_supports_mutable_tags_and_shutdown_but_not_snapshots_or_volumes() {
        let caps = Capabilities::local();
        assert!(caps.supports_mutable_tags);
        assert!(caps.supports_shutdown_hosts);
        assert!(!caps.supports_snapshots);
        assert!(!caps.supports_volumes);
    }

    #[test]
    fn serverless_is_the_only_backend_supporting_snapshots_without_shutdown() {
        let caps = Capabilities::serverless();
        assert!(caps.supports_snapshots);
        assert!(!caps.supports_shutdown_hosts);
    }
}
