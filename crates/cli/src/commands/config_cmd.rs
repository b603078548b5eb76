// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr config show|path` (§6, additive): surfaces the resolved
//! configuration. Performs no mutation.

use clap::Subcommand;

use crate::config::Config;
use crate::exit_error::ExitError;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration as TOML.
    Show,
    /// Print the path `config.toml` is read from.
    Path,
}

pub fn run(config: &Config, command: ConfigCommand) -> Result<(), ExitError> {
    match command {
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config)
                .map_err(|e| ExitError::new(1, format!("failed to render config: {e}")))?;
            print!("{text}");
        }
        ConfigCommand::Path => {
            println!("{}", crate::config::config_path().display());
        }
    }
    Ok(())
}
