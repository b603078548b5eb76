// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::*;

#[test]
fn rsync_command_excludes_git_dir_unless_opted_in() {
    let cmd = rsync_command(Path::new("/src"), Path::new("/dst"), false);
    assert!(cmd.contains(&"--exclude=.git".to_string()));

    let cmd = rsync_command(Path::new("/src"), Path::new("/dst"), true);
    assert!(!cmd.contains(&"--exclude=.git".to_string()));
}

#[test]
fn agent_work_dir_nests_under_the_agent_id() {
    let path = agent_work_dir(Path::new("/host/agents"), "agt-123");
    assert_eq!(path, Path::new("/host/agents/agt-123/workdir"));
}

#[tokio::test]
async fn in_place_strategy_leaves_the_destination_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("src");
    let dest = dir.path().join("dst");
    tokio::fs::create_dir_all(&source).await.expect("mkdir");

    populate_work_dir(WorkDirCopyStrategy::InPlace, &source, &dest, false).await.expect("populate");
    assert!(!dest.exists());
}
