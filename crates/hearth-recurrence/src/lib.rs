// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurrence engine for Hearth.
//!
//! Three layers, each usable on its own:
//! - [`rule`]: the typed [`RecurrenceRule`] with its strict textual form.
//! - [`expand`]: bounded expansion of a rule into [`Occurrence`]s.
//! - [`status`]: chore status derived from the expansion.
//!
//! Nothing here performs I/O or reads the system clock; "now" is always an
//! argument.

pub mod expand;
pub mod rule;
pub mod status;

pub use expand::{MAX_ITERATIONS, Occurrence, Occurrences, RuleCursor, expand, occurrences};
pub use rule::{Frequency, RecurrenceRule, parse_weekday_code, weekday_code};
pub use status::{StatusReport, TaskStatus, compute_status, is_due_on_date};
