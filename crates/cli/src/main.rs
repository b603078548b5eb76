// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mngr`: the agent-fleet CLI (§6). The binary itself is a thin
//! warm-successor wrapper (§4.3) around [`cli_entry`], which does the real
//! work inside a freshly built Tokio runtime — `mngr_warm::EntryPoint` is a
//! plain synchronous `fn(Vec<String>) -> i32`, so there is nowhere upstream
//! of this file that can already be inside an async context.

mod cli_enums;
mod commands;
mod config;
mod exit_error;
mod logging;
mod output;
mod providers;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "mngr", version, about = "Manage a fleet of coding-agent sessions across hosts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    List(commands::list::ListArgs),
    Create(commands::create::CreateArgs),
    Destroy(commands::destroy::DestroyArgs),
    Start(commands::start::StartArgs),
    Stop(commands::stop::StopArgs),
    Connect(commands::connect::ConnectArgs),
    Exec(commands::exec::ExecArgs),
    Rename(commands::rename::RenameArgs),
    Message(commands::message::MessageArgs),
    Logs(commands::logs::LogsArgs),
    Cleanup(commands::cleanup::CleanupArgs),
    Enforce(commands::enforce::EnforceArgs),
    /// Inspect the resolved configuration.
    Config {
        #[command(subcommand)]
        command: commands::config_cmd::ConfigCommand,
    },
}

fn main() {
    let code = mngr_warm::run_warm_cli("mngr", cli_entry, mngr_warm::DEFAULT_IDLE_TIMEOUT);
    std::process::exit(code);
}

/// The synchronous [`mngr_warm::EntryPoint`] every invocation (warm or cold)
/// runs through. Builds its own runtime since it cannot assume one already
/// exists on the calling thread.
fn cli_entry(argv: Vec<String>) -> i32 {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return 1;
        }
    };
    runtime.block_on(async_main(argv))
}

async fn async_main(argv: Vec<String>) -> i32 {
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { 2 } else { 0 };
        }
    };

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => return report(ExitError::from(e)),
    };
    let state_root = config::host_dir(&config);

    let _log_guard = logging::init(&config::config_dir().join("logs"));

    match dispatch(&config, &state_root, cli.command).await {
        Ok(code) => code,
        Err(e) => report(e),
    }
}

async fn dispatch(config: &config::Config, state_root: &std::path::Path, command: Commands) -> Result<i32, ExitError> {
    if let Commands::Config { command } = command {
        return commands::config_cmd::run(config, command).map(|()| 0);
    }

    let provider_map = providers::build(config, state_root).await;
    let fleet = mngr_fleet::Fleet::new(provider_map.clone(), state_root);
    let prefix = config.prefix.as_str();

    match command {
        Commands::List(args) => commands::list::run(&fleet, args).await.map(|()| 0),
        Commands::Create(args) => commands::create::run(&provider_map, prefix, args).await.map(|()| 0),
        Commands::Destroy(args) => commands::destroy::run(&fleet, args).await.map(|()| 0),
        Commands::Start(args) => commands::start::run(&fleet, prefix, args).await.map(|()| 0),
        Commands::Stop(args) => commands::stop::run(&fleet, args).await.map(|()| 0),
        Commands::Connect(args) => commands::connect::run(&fleet, state_root, prefix, args).await,
        Commands::Exec(args) => commands::exec::run(&fleet, args).await.map(|()| 0),
        Commands::Rename(args) => commands::rename::run(&fleet, args).await.map(|()| 0),
        Commands::Message(args) => commands::message::run(&fleet, args).await.map(|()| 0),
        Commands::Logs(args) => commands::logs::run(&fleet, &provider_map, args).await.map(|()| 0),
        Commands::Cleanup(args) => commands::cleanup::run(&fleet, args).await.map(|()| 0),
        Commands::Enforce(args) => commands::enforce::run(&fleet, &config.idle, args).await.map(|()| 0),
        Commands::Config { .. } => unreachable!("handled above before provider construction"),
    }
}

fn report(err: ExitError) -> i32 {
    eprintln!("{err}");
    err.code
}
