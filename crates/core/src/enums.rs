// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed sum types shared across the manager.

use serde::{Deserialize, Serialize};

/// A named point in the plugin lifecycle at which registered hooks run, in
/// registration order, chain-of-responsibility style (see [`crate::error`]
/// for how a single hook failure is surfaced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleHook {
    OnStartup,
    OnShutdown,
    OnBeforeCommand,
    OnAfterCommand,
    OnError,
}

crate::simple_display! {
    LifecycleHook {
        OnStartup => "on_startup",
        OnShutdown => "on_shutdown",
        OnBeforeCommand => "on_before_command",
        OnAfterCommand => "on_after_command",
        OnError => "on_error",
    }
}

/// Logging verbosity, independent of the `tracing` filter syntax used to
/// configure it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

crate::simple_display! {
    LogLevel {
        Trace => "trace",
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

/// How the activity watcher decides a host is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleMode {
    /// Never trigger shutdown on idleness.
    #[default]
    Disabled,
    /// Idle iff the most-recently-touched activity source is older than the
    /// threshold.
    AnySource,
    /// Idle iff every agent's activity is older than the threshold and at
    /// least one agent exists.
    AllAgentsIdle,
}

crate::simple_display! {
    IdleMode {
        Disabled => "disabled",
        AnySource => "any_source",
        AllAgentsIdle => "all_agents_idle",
    }
}

/// A named kind of liveness signal whose freshness drives idle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Ssh,
    AgentMessage,
    AgentProcess,
}

crate::simple_display! {
    ActivitySource {
        Ssh => "ssh",
        AgentMessage => "agent_message",
        AgentProcess => "agent_process",
    }
}

/// What `cleanup` does with each selected agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupAction {
    Destroy,
    Stop,
}

crate::simple_display! {
    CleanupAction {
        Destroy => "destroy",
        Stop => "stop",
    }
}

/// Whether a fleet-pipeline operation aborts on the first per-item error or
/// collects every failure and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorBehavior {
    #[default]
    Continue,
    Abort,
}

crate::simple_display! {
    ErrorBehavior {
        Continue => "CONTINUE",
        Abort => "ABORT",
    }
}

/// CLI output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Jsonl,
}

crate::simple_display! {
    OutputFormat {
        Human => "human",
        Json => "json",
        Jsonl => "jsonl",
    }
}

/// How `create_agent_work_dir` should reconcile a source tree that has
/// uncommitted changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncommittedChangesMode {
    /// Fail with `UncommittedChangesError`.
    #[default]
    Fail,
    /// Stash uncommitted changes before copying, leaving the source clean.
    Stash,
    /// Merge uncommitted changes into the new work dir.
    Merge,
    /// Copy over them unconditionally.
    Clobber,
}

crate::simple_display! {
    UncommittedChangesMode {
        Fail => "fail",
        Stash => "stash",
        Merge => "merge",
        Clobber => "clobber",
    }
}

/// Derived host state (§4.7). Never stored directly; always recomputed from
/// `stop_reason`, provider liveness and connectivity signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostState {
    Building,
    Starting,
    Running,
    Paused,
    Stopped,
    Destroyed,
}

crate::simple_display! {
    HostState {
        Building => "BUILDING",
        Starting => "STARTING",
        Running => "RUNNING",
        Paused => "PAUSED",
        Stopped => "STOPPED",
        Destroyed => "DESTROYED",
    }
}

/// Derived agent lifecycle state (§4.6). Never stored directly; always
/// recomputed from the host's online-ness, the multiplexer session and the
/// agent's reported marker files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentLifecycleState {
    Running,
    Waiting,
    Stopped,
    Done,
    Replaced,
}

crate::simple_display! {
    AgentLifecycleState {
        Running => "RUNNING",
        Waiting => "WAITING",
        Stopped => "STOPPED",
        Done => "DONE",
        Replaced => "REPLACED",
    }
}

#[cfg(test)]
#[path = "enums_tests.rs"]
mod tests;
