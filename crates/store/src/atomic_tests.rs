// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    name: String,
    count: u32,
}

#[test]
fn write_atomic_json_then_read_json_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.json");
    let value = Sample { name: "a1".to_string(), count: 3 };

    write_atomic_json(&path, &value).expect("write");
    let back: Option<Sample> = read_json(&path).expect("read");
    assert_eq!(back, Some(value));
}

#[test]
fn read_json_returns_none_for_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.json");
    let back: Option<Sample> = read_json(&path).expect("read");
    assert_eq!(back, None);
}

#[test]
fn write_atomic_json_leaves_no_tmp_sibling_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.json");
    write_atomic_json(&path, &Sample { name: "a1".to_string(), count: 1 }).expect("write");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("data.json")]);
}

#[test]
fn read_json_lenient_treats_corrupt_json_as_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"{not valid json").expect("write raw");

    let back: Option<Sample> = read_json_lenient(&path);
    assert_eq!(back, None);
}

#[test]
fn write_atomic_json_creates_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("agents").join("agt-1").join("data.json");
    write_atomic_json(&path, &Sample { name: "a1".to_string(), count: 1 }).expect("write");
    assert!(path.exists());
}
