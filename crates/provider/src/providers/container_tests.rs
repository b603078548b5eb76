// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mngr_core::HostId;

use super::*;

#[test]
fn pod_name_is_a_valid_kubernetes_resource_name() {
    let id = HostId::derive("container", "h1");
    let name = pod_name(&id);
    assert!(name.starts_with("mngr-"));
    assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
}

#[test]
fn pod_name_is_stable_for_the_same_host_id() {
    let id = HostId::derive("container", "h1");
    assert_eq!(pod_name(&id), pod_name(&id));
}
