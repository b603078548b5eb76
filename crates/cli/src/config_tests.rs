// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_from(&dir.path().join("config.toml")).expect("default config");
    assert_eq!(config.prefix, "mngr-");
    assert!(config.providers.is_empty());
}

#[test]
fn malformed_toml_is_a_config_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "not valid = [toml").expect("write");
    let err = load_from(&path).expect_err("should fail to parse");
    assert!(matches!(err, MngrError::ConfigParse { .. }));
}

#[test]
fn providers_table_parses_mixed_backends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        prefix = "agents-"

        [providers.box1]
        backend = "local"

        [providers.remote1]
        backend = "ssh"
        host = "198.51.100.4"
        user = "deploy"
        "#,
    )
    .expect("write");

    let config = load_from(&path).expect("parse");
    assert_eq!(config.prefix, "agents-");
    assert_eq!(config.providers.len(), 2);
    assert!(matches!(config.providers.get("box1"), Some(ProviderInstanceConfig::Local)));
    match config.providers.get("remote1") {
        Some(ProviderInstanceConfig::Ssh { host, user, port }) => {
            assert_eq!(host, "198.51.100.4");
            assert_eq!(user, "deploy");
            assert_eq!(*port, 22);
        }
        other => panic!("expected ssh provider, got {other:?}"),
    }
}
