// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clap` value parsers for the `mngr-core` enums used directly as CLI
//! flags. `mngr-core` does not depend on `clap` (it is shared by every
//! crate, including the ones with no CLI surface), so the string mapping
//! lives here instead of a derive on the enum itself.

use mngr_core::{CleanupAction, OutputFormat};

pub fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        "jsonl" => Ok(OutputFormat::Jsonl),
        other => Err(format!("invalid format {other:?} (expected human, json, or jsonl)")),
    }
}

pub fn parse_cleanup_action(s: &str) -> Result<CleanupAction, String> {
    match s {
        "destroy" => Ok(CleanupAction::Destroy),
        "stop" => Ok(CleanupAction::Stop),
        other => Err(format!("invalid action {other:?} (expected destroy or stop)")),
    }
}
