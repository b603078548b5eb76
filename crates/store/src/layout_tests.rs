// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mngr_core::AgentId;

use super::*;

#[test]
fn agent_paths_nest_under_the_agent_id_directory() {
    let paths = HostPaths::new("/hosts/h1");
    let id = AgentId::from_string("agt-deadbeef");

    assert_eq!(paths.agent_dir(&id), Path::new("/hosts/h1/agents/agt-deadbeef"));
    assert_eq!(paths.agent_data_json(&id), Path::new("/hosts/h1/agents/agt-deadbeef/data.json"));
    assert_eq!(
        paths.agent_activity_file(&id, "ssh"),
        Path::new("/hosts/h1/agents/agt-deadbeef/activity/ssh")
    );
    assert_eq!(
        paths.agent_reported_status_md(&id),
        Path::new("/hosts/h1/agents/agt-deadbeef/reported/status.md")
    );
}

#[test]
fn host_level_paths_match_the_documented_layout() {
    let paths = HostPaths::new("/hosts/h1");

    assert_eq!(paths.data_json(), Path::new("/hosts/h1/data.json"));
    assert_eq!(paths.tags_json(), Path::new("/hosts/h1/tags.json"));
    assert_eq!(paths.ssh_activity_file(), Path::new("/hosts/h1/activity/ssh"));
    assert_eq!(paths.lock_file(), Path::new("/hosts/h1/.lock"));
    assert_eq!(paths.signal_file("mngr-a1"), Path::new("/hosts/h1/signals/mngr-a1"));
}
