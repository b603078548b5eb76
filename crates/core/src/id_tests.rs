// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

// --- define_id! macro tests ---

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    let id = TestId::from_string("tst-k");
    map.insert(id, 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_new_carries_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with(TestId::PREFIX));
}

#[test]
fn define_id_new_creates_unique_ids() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.suffix(), "abcdefghijklmnop");
}

// --- short() tests ---

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

// --- define_id! generated from_string()/Display/From tests ---

#[test]
fn define_id_from_string_round_trips_display() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.to_string(), "tst-abc123");
}

#[test]
fn define_id_from_impls() {
    let from_str: TestId = "tst-xyz".into();
    let from_string: TestId = String::from("tst-xyz").into();
    assert_eq!(from_str, from_string);
}
