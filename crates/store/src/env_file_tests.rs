// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_env_skips_blank_lines_and_comments() {
    let text = "FOO=bar\n\n# a comment\nBAZ=qux=extra\n";
    let parsed = parse_env(text);
    assert_eq!(parsed.get("FOO"), Some(&"bar".to_string()));
    assert_eq!(parsed.get("BAZ"), Some(&"qux=extra".to_string()));
    assert_eq!(parsed.len(), 2);
}

#[test]
fn render_env_then_parse_env_round_trips() {
    let mut env = BTreeMap::new();
    env.insert("A".to_string(), "1".to_string());
    env.insert("B".to_string(), "two".to_string());

    let rendered = render_env(&env);
    let parsed = parse_env(&rendered);
    assert_eq!(parsed, env);
}
