// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root for Hearth.
//!
//! [`HearthRuntime`] wires the hub, reminder scheduler, rate limiter, and
//! janitor from a [`HearthConfig`](hearth_config::HearthConfig) and the
//! host's collaborator implementations. The `hearth` binary adds a small
//! CLI around the recurrence engine and the config loader.

pub mod cli;
pub mod runtime;
pub mod shutdown;
pub mod telemetry;

pub use runtime::HearthRuntime;
pub use shutdown::install_signal_handler;
pub use telemetry::init_tracing;
