// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn derive_is_deterministic() {
    let a = HostId::derive("aws-1", "box-a");
    let b = HostId::derive("aws-1", "box-a");
    assert_eq!(a, b);
}

#[test]
fn derive_distinguishes_provider_instance() {
    let a = HostId::derive("aws-1", "box-a");
    let b = HostId::derive("aws-2", "box-a");
    assert_ne!(a, b);
}

#[test]
fn derive_distinguishes_host_name() {
    let a = HostId::derive("aws-1", "box-a");
    let b = HostId::derive("aws-1", "box-b");
    assert_ne!(a, b);
}

#[test]
fn round_trips_through_display_and_from_str() {
    let id = HostId::derive("aws-1", "box-a");
    let parsed: HostId = id.to_string().parse().expect("valid uuid");
    assert_eq!(id, parsed);
}

#[test]
fn serializes_as_bare_string() {
    let id = HostId::derive("aws-1", "box-a");
    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, format!("\"{id}\""));
}
