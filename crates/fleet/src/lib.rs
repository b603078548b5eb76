// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mngr-fleet: the fleet pipeline (C12) and idle/timeout enforcement (C13).
//!
//! Everything here operates across every agent a set of provider instances
//! reports, grouped by host so a batch `start`/`stop`/`exec`/`message`
//! issues one call per host rather than one per agent. `mngr-cli` resolves
//! `--all`/name arguments down to a concrete id list (or an include/exclude
//! filter) before calling in here; this crate never parses CLI flags.

pub mod enforce;
pub mod filter;
pub mod model;
pub mod pipeline;

pub use enforce::EnforceDecision;
pub use filter::{parse as parse_filter, Expr, FilterError};
pub use model::{AgentSummary, OpResult};
pub use pipeline::{Fleet, ListResult, ProviderMap};
