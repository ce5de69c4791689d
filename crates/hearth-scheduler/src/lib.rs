// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background reminder delivery for Hearth.
//!
//! - [`ReminderScheduler`]: periodic calendar reminders and daily chore
//!   summaries, deduplicated through a [`SentLedger`](hearth_core::SentLedger).
//! - [`MemorySentLedger`]: an in-memory ledger.
//! - [`RateLimiter`]: fixed-window limiter gating ad-hoc notifications.
//! - [`Janitor`]: periodic sweep of limiter windows and old ledger rows.

pub mod janitor;
pub mod ledger;
pub mod payload;
pub mod rate_limit;
pub mod scheduler;

pub use janitor::{Janitor, SweepReport};
pub use ledger::MemorySentLedger;
pub use rate_limit::RateLimiter;
pub use scheduler::{Collaborators, DEFAULT_TICK_INTERVAL, ReminderScheduler, TickReport};
