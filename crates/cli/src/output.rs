// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering helpers shared by every subcommand: a text table for humans, a
//! single JSON document, or one JSON object per line (§6's
//! `--format human|json|jsonl`).

use mngr_core::OutputFormat;
use mngr_fleet::{AgentSummary, OpResult};
use serde::Serialize;

pub fn print_agent_list(agents: &[AgentSummary], errors: &[(mngr_core::ProviderInstanceName, String)], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            if agents.is_empty() {
                println!("No agents found.");
            } else {
                println!("{:<20} {:<12} {:<10} {:<16} {:<8} {:<8}", "NAME", "TYPE", "STATE", "HOST", "AGE", "IDLE");
                for agent in agents {
                    println!(
                        "{:<20} {:<12} {:<10} {:<16} {:<8} {:<8}",
                        agent.name.as_str(),
                        agent.agent_type.as_str(),
                        agent.state.to_string(),
                        agent.host_name.as_str(),
                        format_elapsed(agent.age_seconds),
                        agent.idle_seconds.map(format_elapsed).unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
            for (provider, message) in errors {
                eprintln!("warning: provider {provider} failed to list: {message}");
            }
        }
        OutputFormat::Json => {
            let doc = serde_json::json!({ "agents": agents, "errors": errors });
            println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
        }
        OutputFormat::Jsonl => {
            for agent in agents {
                println!("{}", serde_json::to_string(agent).unwrap_or_default());
            }
        }
    }
}

/// Shared rendering for every C12 mutating operation's `OpResult`.
pub fn print_op_result<T: Serialize>(label: &str, result: &OpResult<T>, format: OutputFormat, describe: impl Fn(&T) -> String) {
    match format {
        OutputFormat::Human => {
            for item in &result.successful {
                println!("{label}: {}", describe(item));
            }
            for (name, message) in &result.failed {
                eprintln!("{label} failed for {name}: {message}");
            }
            for message in &result.errors {
                eprintln!("{label} error: {message}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        }
        OutputFormat::Jsonl => {
            for item in &result.successful {
                println!("{}", serde_json::to_string(item).unwrap_or_default());
            }
        }
    }
}

/// Relative time formatting for the human table (`5s`, `2m`, `1h`, `3d`),
/// grounded on the same table used by the warm/activity display elsewhere
/// in this stack.
pub fn format_elapsed(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h", seconds / 3600)
    } else {
        format!("{}d", seconds / 86_400)
    }
}
