// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shapes the fleet pipeline passes around: one row per agent as seen
//! by `list_agents`, and the filter adapter for it (§4.12).

use std::collections::BTreeMap;

use mngr_core::{AgentId, AgentLifecycleState, AgentName, AgentTypeName, HostId, HostName, HostState, ProviderInstanceName};
use serde::Serialize;

use crate::filter::{FieldValue, FilterTarget};

/// One row of a `list_agents` result: an agent plus the host-level context
/// a filter expression can see (§4.12's field set).
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: AgentName,
    pub agent_type: AgentTypeName,
    pub state: AgentLifecycleState,
    pub host_id: HostId,
    pub host_name: HostName,
    pub host_state: HostState,
    pub provider: ProviderInstanceName,
    pub host_tags: BTreeMap<String, String>,
    pub age_seconds: u64,
    pub idle_seconds: Option<u64>,
}

impl FilterTarget for AgentSummary {
    fn field(&self, path: &[String]) -> Option<FieldValue> {
        match path {
            [a] if a == "id" => Some(FieldValue::Str(self.id.to_string())),
            [a] if a == "name" => Some(FieldValue::Str(self.name.to_string())),
            [a] if a == "type" => Some(FieldValue::Str(self.agent_type.to_string())),
            [a] if a == "state" => Some(FieldValue::Str(self.state.to_string())),
            [a] if a == "age" => Some(FieldValue::Num(self.age_seconds)),
            [a] if a == "idle" => Some(FieldValue::OptNum(self.idle_seconds)),
            [a, b] if a == "host" && b == "id" => Some(FieldValue::Str(self.host_id.to_string())),
            [a, b] if a == "host" && b == "name" => Some(FieldValue::Str(self.host_name.to_string())),
            [a, b] if a == "host" && b == "provider" => Some(FieldValue::Str(self.provider.to_string())),
            [a, b] if a == "host" && b == "state" => Some(FieldValue::Str(self.host_state.to_string())),
            [a, b, key] if a == "host" && b == "tags" => {
                Some(FieldValue::OptStr(self.host_tags.get(key).cloned()))
            }
            _ => None,
        }
    }
}

/// Structured partial-failure result shared by every mutating fleet
/// operation (§4.12: "every operation returns a structured result
/// `{successful, failed, errors}` and never aborts under `CONTINUE`").
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpResult<T> {
    pub successful: Vec<T>,
    pub failed: Vec<(String, String)>,
    pub errors: Vec<String>,
}

impl<T> OpResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&mut self, item: T) {
        self.successful.push(item);
    }

    pub fn push_failed(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.failed.push((name.into(), message.into()));
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}
