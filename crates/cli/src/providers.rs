// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the [`mngr_fleet::ProviderMap`] the config file describes. A
//! backend that fails to construct (unreachable kube API, bad SSH key) is
//! logged and dropped rather than aborting the whole command — the
//! remaining providers still work, mirroring §4.10's per-provider error
//! isolation during listing.

use std::path::PathBuf;
use std::sync::Arc;

use mngr_core::ProviderInstanceName;
use mngr_fleet::ProviderMap;
use mngr_provider::{
    ContainerProvider, LocalProvider, Provider, ServerlessProvider, ServerlessProviderConfig, SshProvider,
    SshProviderConfig,
};

use crate::config::{Config, ProviderInstanceConfig};

pub async fn build(config: &Config, host_dir: &std::path::Path) -> ProviderMap {
    let mut providers: ProviderMap = ProviderMap::new();

    if config.providers.is_empty() {
        let name = ProviderInstanceName::new("local").expect("literal slug");
        let provider: Arc<dyn Provider> = Arc::new(LocalProvider::new(name.clone(), host_dir.join("local")));
        providers.insert(name, provider);
        return providers;
    }

    for (instance, backend) in &config.providers {
        let Ok(name) = ProviderInstanceName::new(instance) else {
            tracing::warn!(instance, "invalid provider instance name in config, skipping");
            continue;
        };
        let root: PathBuf = host_dir.join(instance);

        let provider: Option<Arc<dyn Provider>> = match backend {
            ProviderInstanceConfig::Local => Some(Arc::new(LocalProvider::new(name.clone(), root))),
            ProviderInstanceConfig::Ssh { host, user, port } => match load_ssh_key() {
                Ok(private_key) => Some(Arc::new(SshProvider::new(
                    name.clone(),
                    SshProviderConfig { address: host.clone(), port: *port, user: user.clone(), private_key },
                ))),
                Err(e) => {
                    tracing::warn!(instance, error = %e, "failed to load SSH key, skipping provider instance");
                    None
                }
            },
            ProviderInstanceConfig::Container { namespace } => match kube::Client::try_default().await {
                Ok(client) => {
                    Some(Arc::new(ContainerProvider::new(name.clone(), root, client, namespace.clone().unwrap_or_else(|| "default".to_string()))))
                }
                Err(e) => {
                    tracing::warn!(instance, error = %e, "failed to reach kube API, skipping provider instance");
                    None
                }
            },
            ProviderInstanceConfig::Serverless { base_url, api_key_env } => {
                let api_key = api_key_env.as_deref().and_then(|var| std::env::var(var).ok()).unwrap_or_default();
                Some(Arc::new(ServerlessProvider::new(
                    name.clone(),
                    root,
                    ServerlessProviderConfig { base_url: base_url.clone(), api_key },
                )))
            }
        };

        if let Some(provider) = provider {
            providers.insert(name, provider);
        }
    }

    providers
}

fn load_ssh_key() -> Result<russh_keys::key::KeyPair, anyhow::Error> {
    let path = std::env::var("MNGR_SSH_KEY")
        .map(PathBuf::from)
        .or_else(|_| dirs::home_dir().map(|h| h.join(".ssh/id_ed25519")).ok_or(std::env::VarError::NotPresent))
        .map_err(|_| anyhow::anyhow!("no SSH key configured (set MNGR_SSH_KEY)"))?;
    russh_keys::load_secret_key(path, None).map_err(|e| anyhow::anyhow!(e))
}
