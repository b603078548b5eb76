// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The named domain-error taxonomy (§7). Concrete subsystem errors (process
//! supervision, provider SDK failures) live in their own crates and are
//! wrapped into a fleet-level per-item failure rather than re-expressed
//! here; this enum covers the domain errors that are recognized across the
//! whole manager.

use thiserror::Error;

/// How a recognized domain error should be handled by a caller that has a
/// choice (the fleet pipeline, mostly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRecovery {
    /// Surface immediately; never retried, never downgraded to per-item.
    Immediate,
    /// Fails one item in a fan-out; under `ErrorBehavior::Continue` the
    /// pipeline keeps going and records the failure.
    PerItem,
    /// A capability the provider doesn't support; generic capability-guarded
    /// code converts this to a no-op rather than a failure.
    Capability,
}

#[derive(Debug, Error)]
pub enum MngrError {
    #[error("{message}")]
    UserInput { message: String, help: Option<String> },

    #[error("failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("configuration is structurally invalid: {message}")]
    ConfigStructure { message: String },

    #[error("host {name:?} not found")]
    HostNotFound { name: String },

    #[error("agent {name:?} not found")]
    AgentNotFound { name: String },

    #[error("host {name:?} is not running")]
    HostNotRunning { name: String },

    #[error("host {name:?} is not stopped")]
    HostNotStopped { name: String },

    #[error("host {name:?} is offline")]
    HostOffline { name: String },

    #[error("host name {name:?} is already in use on this provider instance")]
    HostNameConflict { name: String },

    #[error("image {image:?} not found")]
    ImageNotFound { image: String },

    #[error("snapshot {id:?} not found")]
    SnapshotNotFound { id: String },

    #[error("snapshots are not supported by this provider")]
    SnapshotsNotSupported,

    #[error("{what} is not supported by this provider")]
    NotSupported { what: &'static str },

    #[error("tag limit exceeded: {limit} tags allowed, {attempted} requested")]
    TagLimitExceeded { limit: usize, attempted: usize },

    #[error("failed to clone {repo}: {message}")]
    GitClone { repo: String, message: String },

    #[error("{path} has uncommitted changes and uncommitted_changes_mode is fail")]
    UncommittedChanges { path: String },

    #[error("plugin {plugin:?} failed: {message}")]
    PluginMngr { plugin: String, message: String },

    #[error("refusing to nest a tmux session inside another tmux session")]
    NestedTmux,

    #[error("{path} is not a trusted directory")]
    ClaudeDirectoryNotTrusted { path: String },

    #[error("provider error: {message}")]
    Provider { message: String },
}

impl MngrError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput { message: message.into(), help: None }
    }

    pub fn user_input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::UserInput { message: message.into(), help: Some(help.into()) }
    }

    /// The optional second line of user-facing output (§7 propagation
    /// policy: "errors carrying a `user_help_text`...").
    pub fn user_help_text(&self) -> Option<&str> {
        match self {
            Self::UserInput { help, .. } => help.as_deref(),
            Self::NestedTmux => Some("run mngr from outside the tmux session, or use `connect` instead"),
            Self::ClaudeDirectoryNotTrusted { .. } => {
                Some("add this directory to the agent type's trusted-directory list")
            }
            _ => None,
        }
    }

    pub fn recovery(&self) -> ErrorRecovery {
        match self {
            Self::UserInput { .. } | Self::ConfigParse { .. } | Self::ConfigStructure { .. } => {
                ErrorRecovery::Immediate
            }
            Self::HostNameConflict { .. } => ErrorRecovery::Immediate,
            Self::NestedTmux | Self::ClaudeDirectoryNotTrusted { .. } => ErrorRecovery::Immediate,
            Self::SnapshotsNotSupported | Self::NotSupported { .. } => ErrorRecovery::Capability,
            _ => ErrorRecovery::PerItem,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
