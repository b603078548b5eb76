// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for the workspace's black-box `mngr` binary specs. Cargo
//! only looks at this file for the `specs` test target; everything under
//! `tests/specs/` is wired in below.

#[path = "support/mod.rs"]
mod support;

#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/cli/config.rs"]
mod cli_config;

#[path = "specs/cli/list.rs"]
mod cli_list;

#[path = "specs/cli/errors.rs"]
mod cli_errors;
