// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use async_trait::async_trait;
use mngr_core::{HostId, HostName, MngrError};

use super::*;

#[test]
fn command_result_success_requires_exit_code_zero() {
    let ok = CommandResult { stdout: String::new(), stderr: String::new(), returncode: Some(0) };
    let failed = CommandResult { stdout: String::new(), stderr: String::new(), returncode: Some(1) };
    let killed = CommandResult { stdout: String::new(), stderr: String::new(), returncode: None };
    assert!(ok.success());
    assert!(!failed.success());
    assert!(!killed.success());
}

/// A provider that implements only the required methods, to exercise the
/// default capability-gated bodies.
struct BareProvider;

#[async_trait]
impl Provider for BareProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::none()
    }

    async fn create_host(
        &self,
        _name: HostName,
        _image: Option<mngr_core::ImageReference>,
        _tags: BTreeMap<String, String>,
        _build_args: BTreeMap<String, String>,
        _start_args: BTreeMap<String, String>,
        _known_hosts: Vec<String>,
        _authorized_keys: Vec<String>,
        _snapshot: Option<SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        Err(MngrError::Provider { message: "unimplemented".into() })
    }

    async fn stop_host(&self, _host: &HostId, _create_snapshot: bool, _timeout: Duration) -> Result<(), MngrError> {
        Ok(())
    }

    async fn start_host(
        &self,
        _host: &HostId,
        _snapshot_id: Option<&SnapshotId>,
    ) -> Result<Box<dyn OnlineHostInterface>, MngrError> {
        Err(MngrError::HostNotStopped { name: "x".into() })
    }

    async fn destroy_host(&self, _host: &HostId) -> Result<(), MngrError> {
        Ok(())
    }

    async fn get_host(&self, _host: &HostId) -> Result<Box<dyn HostInterface>, MngrError> {
        Err(MngrError::HostNotFound { name: "x".into() })
    }

    async fn list_hosts(&self, _include_destroyed: bool) -> Vec<HostSummary> {
        Vec::new()
    }

    async fn get_host_resources(&self, _host: &HostId) -> Result<HostResources, MngrError> {
        Err(MngrError::Provider { message: "no data".into() })
    }
}

#[tokio::test]
async fn default_snapshot_methods_report_not_supported() {
    let provider = BareProvider;
    let host = HostId::derive("local", "h1");
    let err = provider.create_snapshot(&host, SnapshotName::new("s1").expect("name")).await.unwrap_err();
    assert!(matches!(err, MngrError::SnapshotsNotSupported));
}

#[tokio::test]
async fn default_volume_methods_report_not_supported() {
    let provider = BareProvider;
    let err = provider.create_volume("vol", 10).await.unwrap_err();
    assert!(matches!(err, MngrError::NotSupported { what: "volumes" }));
}

#[tokio::test]
async fn default_tag_methods_report_not_supported() {
    let provider = BareProvider;
    let host = HostId::derive("local", "h1");
    let err = provider.set_tags(&host, BTreeMap::new()).await.unwrap_err();
    assert!(matches!(err, MngrError::NotSupported { what: "tags" }));
}
