// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-type registry and `parent_type` resolution (§4.14).

use std::collections::{BTreeMap, HashSet};

use mngr_core::{AgentTypeName, CommandString, MngrError, Permission};
use serde::{Deserialize, Serialize};

/// One registered agent type, possibly inheriting from a `parent_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTypeDef {
    pub name: AgentTypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<AgentTypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandString>,
    #[serde(default)]
    pub cli_args: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// The resolved form of an [`AgentTypeDef`] after walking its parent chain:
/// permissions unioned, `cli_args` appended parent-first, scalars taken from
/// the most specific ancestor that set them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgentType {
    pub command: Option<CommandString>,
    pub cli_args: Vec<String>,
    pub permissions: Vec<Permission>,
}

/// The set of agent types known to one `mngr` invocation: built-ins plus any
/// user-configured overrides, merged by name before resolution runs.
#[derive(Debug, Clone, Default)]
pub struct AgentTypeRegistry {
    types: BTreeMap<AgentTypeName, AgentTypeDef>,
}

impl AgentTypeRegistry {
    pub fn new() -> Self {
        Self { types: BTreeMap::new() }
    }

    /// Register `def`, replacing any existing definition of the same name (a
    /// user override of a built-in merges by simply taking the later one;
    /// config loading is responsible for merging fields before calling this
    /// if a field-level merge is desired).
    pub fn register(&mut self, def: AgentTypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &AgentTypeName) -> Option<&AgentTypeDef> {
        self.types.get(name)
    }
}

/// Walk `name`'s `parent_type` chain to a fully resolved command (§4.14). A
/// cycle, or a `parent_type` that names nothing in `registry`, fails with
/// [`MngrError::ConfigParse`].
pub fn resolve_agent_type(
    registry: &AgentTypeRegistry,
    name: &AgentTypeName,
) -> Result<ResolvedAgentType, MngrError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = name.clone();

    loop {
        if !seen.insert(current.clone()) {
            return Err(MngrError::ConfigParse {
                message: format!("agent type {:?} has a cycle in its parent_type chain", name.as_str()),
            });
        }
        let def = registry.get(&current).ok_or_else(|| MngrError::ConfigParse {
            message: format!("agent type {:?} is not registered", current.as_str()),
        })?;
        chain.push(def);
        match &def.parent_type {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }

    // `chain` is child-first; fold it parent-first so cli_args append in
    // parent order and the most specific scalar wins last.
    let mut resolved = ResolvedAgentType { command: None, cli_args: Vec::new(), permissions: Vec::new() };
    let mut permission_set: Vec<Permission> = Vec::new();
    for def in chain.into_iter().rev() {
        resolved.cli_args.extend(def.cli_args.iter().cloned());
        if def.command.is_some() {
            resolved.command = def.command.clone();
        }
        for perm in &def.permissions {
            if !permission_set.contains(perm) {
                permission_set.push(perm.clone());
            }
        }
    }
    resolved.permissions = permission_set;
    Ok(resolved)
}

#[cfg(test)]
#[path = "agent_type_tests.rs"]
mod tests;
