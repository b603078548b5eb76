// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic, tmux-backed `AgentInterface` (C6, §4.14) shared by every
//! backend: only the channel `execute_command` runs over differs between
//! local/SSH/container/serverless, so one implementation covers them all.

use async_trait::async_trait;
use mngr_core::{AgentId, AgentName, MngrError};

use crate::agent_type::{resolve_agent_type, AgentTypeRegistry};
use crate::contract::AgentInterface;

/// How many times `send_message` retries a transient tmux failure before
/// giving up (§4.14: "retried once on transient failure").
const SEND_MESSAGE_RETRIES: u32 = 1;

/// One agent addressed through its host's tmux session. `execute_command` is
/// supplied by the owning host (local: direct subprocess, SSH: over the
/// session, container: `kubectl exec`/docker exec) so this struct stays
/// backend-agnostic.
pub struct TmuxAgentInterface<E> {
    id: AgentId,
    name: AgentName,
    tmux_prefix: String,
    agent_type: mngr_core::AgentTypeName,
    executor: E,
}

/// The minimal capability `TmuxAgentInterface` needs from its host: run a
/// shell command and report whether it succeeded.
#[async_trait]
pub trait CommandExecutor: Send + Sync + 'static {
    async fn run(&self, command: &str) -> Result<bool, MngrError>;
}

impl<E: CommandExecutor> TmuxAgentInterface<E> {
    pub fn new(id: AgentId, name: AgentName, tmux_prefix: String, agent_type: mngr_core::AgentTypeName, executor: E) -> Self {
        Self { id, name, tmux_prefix, agent_type, executor }
    }

    pub fn session_name(&self) -> String {
        format!("{}{}", self.tmux_prefix, self.name.as_str())
    }
}

#[async_trait]
impl<E: CommandExecutor> AgentInterface for TmuxAgentInterface<E> {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn name(&self) -> &AgentName {
        &self.name
    }

    async fn send_message(&self, text: &str) -> Result<(), MngrError> {
        let command = send_keys_command(&self.session_name(), text);
        let mut attempts_left = SEND_MESSAGE_RETRIES + 1;
        loop {
            match self.executor.run(&command).await {
                Ok(true) => return Ok(()),
                Ok(false) | Err(_) if attempts_left > 1 => {
                    attempts_left -= 1;
                    tracing::warn!(session = %self.session_name(), "send_message failed, retrying");
                }
                Ok(false) => {
                    return Err(MngrError::Provider {
                        message: format!("send-keys to session {} failed", self.session_name()),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn assemble_command(
        &self,
        registry: &AgentTypeRegistry,
        extra_args: &[String],
        override_command: Option<&str>,
    ) -> Result<String, MngrError> {
        if let Some(override_command) = override_command {
            return Ok(override_command.to_string());
        }
        let resolved = resolve_agent_type(registry, &self.agent_type)?;
        let base = resolved.command.ok_or_else(|| MngrError::ConfigParse {
            message: format!("agent type {:?} resolves to no command", self.agent_type.as_str()),
        })?;
        let mut parts = vec![base.as_str().to_string()];
        parts.extend(resolved.cli_args);
        parts.extend(extra_args.iter().cloned());
        Ok(parts.join(" "))
    }
}

/// `tmux send-keys -t <session> <wrapped-text> Enter`, with embedded
/// newlines preserved by sending literal `\n` inside a single-quoted string
/// so the whole message lands as one input (§4.14).
fn send_keys_command(session: &str, text: &str) -> String {
    let escaped = text.replace('\'', "'\\''");
    format!("tmux send-keys -t '{session}' -l '{escaped}' && tmux send-keys -t '{session}' Enter")
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
