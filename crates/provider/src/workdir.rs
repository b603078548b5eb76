// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_agent_work_dir`'s copy strategies (§4.8): populate a new agent's
//! working tree from a source path, optionally on a different host.

use std::path::{Path, PathBuf};

use mngr_core::MngrError;
use mngr_supervisor::process::{run, RunOptions};
use tokio::sync::watch;

use crate::contract::WorkDirCopyStrategy;

/// Build the shell command for one [`WorkDirCopyStrategy`], run locally
/// (callers that need the copy to happen on a remote host instead route it
/// through `OnlineHostInterface::execute_command`).
pub async fn populate_work_dir(
    strategy: WorkDirCopyStrategy,
    source_path: &Path,
    dest_path: &Path,
    include_git_dir: bool,
) -> Result<(), MngrError> {
    if let Some(parent) = dest_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MngrError::Provider { message: format!("failed to create {}: {e}", parent.display()) })?;
    }

    let command = match strategy {
        WorkDirCopyStrategy::Rsync => rsync_command(source_path, dest_path, include_git_dir),
        WorkDirCopyStrategy::Clone => clone_command(source_path, dest_path),
        WorkDirCopyStrategy::Worktree => worktree_command(source_path, dest_path),
        WorkDirCopyStrategy::InPlace => {
            return Ok(());
        }
        WorkDirCopyStrategy::FullCopy => full_copy_command(source_path, dest_path, include_git_dir),
    };

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let finished = run(&command, shutdown_rx, RunOptions::new())
        .await
        .map_err(|e| MngrError::Provider { message: e.to_string() })?;
    finished.check().map_err(|e| MngrError::Provider { message: e.to_string() })?;
    Ok(())
}

fn rsync_command(source: &Path, dest: &Path, include_git_dir: bool) -> Vec<String> {
    let mut args = vec!["rsync".to_string(), "-a".to_string()];
    if !include_git_dir {
        args.push("--exclude=.git".to_string());
    }
    args.push(format!("{}/", source.display()));
    args.push(dest.display().to_string());
    args
}

fn clone_command(source: &Path, dest: &Path) -> Vec<String> {
    vec!["git".to_string(), "clone".to_string(), source.display().to_string(), dest.display().to_string()]
}

fn worktree_command(source: &Path, dest: &Path) -> Vec<String> {
    vec![
        "git".to_string(),
        "-C".to_string(),
        source.display().to_string(),
        "worktree".to_string(),
        "add".to_string(),
        dest.display().to_string(),
    ]
}

fn full_copy_command(source: &Path, dest: &Path, include_git_dir: bool) -> Vec<String> {
    // `cp -a` copies everything including .git; when the caller doesn't want
    // it, rsync's exclude semantics are simpler to express than teaching `cp`
    // to skip a directory, so full-copy without .git reuses the rsync path.
    if include_git_dir {
        vec!["cp".to_string(), "-a".to_string(), format!("{}/.", source.display()), dest.display().to_string()]
    } else {
        rsync_command(source, dest, false)
    }
}

/// Is `path` inside a git worktree with uncommitted changes? Used by the
/// caller to apply `UncommittedChangesMode` before choosing a strategy.
pub async fn has_uncommitted_changes(path: &Path) -> Result<bool, MngrError> {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let command = vec![
        "git".to_string(),
        "-C".to_string(),
        path.display().to_string(),
        "status".to_string(),
        "--porcelain".to_string(),
    ];
    let finished = run(&command, shutdown_rx, RunOptions::new())
        .await
        .map_err(|e| MngrError::Provider { message: e.to_string() })?;
    Ok(!finished.stdout.trim().is_empty())
}

/// Where on disk a new agent's work dir should live, given the host's agent
/// directory and the agent's id.
pub fn agent_work_dir(agents_root: &Path, agent_id: &str) -> PathBuf {
    agents_root.join(agent_id).join("workdir")
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
