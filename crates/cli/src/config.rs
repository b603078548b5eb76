// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ambient configuration layer (§1): a TOML file at
//! `~/.config/mngr/config.toml` (directory name overridable by
//! `MNGR_ROOT_NAME`), holding provider instance definitions, the tmux
//! session-name prefix, and idle-policy defaults. Missing entirely is not
//! an error — every field defaults to something that runs against the
//! local backend out of the box.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mngr_core::{IdleMode, MngrError};
use serde::{Deserialize, Serialize};

/// One provider instance as configured in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ProviderInstanceConfig {
    Local,
    Ssh { host: String, user: String, #[serde(default = "default_ssh_port")] port: u16 },
    Container { #[serde(default)] namespace: Option<String> },
    Serverless { base_url: String, #[serde(default)] api_key_env: Option<String> },
}

fn default_ssh_port() -> u16 {
    22
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlePolicyConfig {
    #[serde(default)]
    pub mode: IdleMode,
    #[serde(default = "default_max_idle_seconds")]
    pub max_idle_seconds: u64,
}

fn default_max_idle_seconds() -> u64 {
    3600
}

impl Default for IdlePolicyConfig {
    fn default() -> Self {
        Self { mode: IdleMode::default(), max_idle_seconds: default_max_idle_seconds() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub host_dir: Option<PathBuf>,
    #[serde(default)]
    pub idle: IdlePolicyConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderInstanceConfig>,
}

fn default_prefix() -> String {
    "mngr-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { prefix: default_prefix(), host_dir: None, idle: IdlePolicyConfig::default(), providers: BTreeMap::new() }
    }
}

/// The directory `config.toml` lives under, honoring `MNGR_ROOT_NAME`
/// (§6's environment variable list) as the config-directory name, not a
/// full path override.
pub fn config_dir() -> PathBuf {
    let root_name = std::env::var("MNGR_ROOT_NAME").unwrap_or_else(|_| "mngr".to_string());
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(root_name)
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// The on-disk state root every host's directory lives under, honoring
/// `MNGR_HOST_DIR` when set.
pub fn host_dir(config: &Config) -> PathBuf {
    if let Ok(dir) = std::env::var("MNGR_HOST_DIR") {
        return PathBuf::from(dir);
    }
    config.host_dir.clone().unwrap_or_else(|| config_dir().join("hosts"))
}

pub fn load() -> Result<Config, MngrError> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Result<Config, MngrError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(MngrError::ConfigParse { message: format!("reading {}: {e}", path.display()) }),
    };
    toml::from_str(&text).map_err(|e| MngrError::ConfigParse { message: format!("{}: {e}", path.display()) })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
