// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent record of emitted reminders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HearthError;
use crate::types::ReminderKey;

/// Records which `(household, kind, reference, lead)` reminders were sent.
///
/// Implementations must be safe for concurrent use. `record_sent` succeeds
/// whether or not a row for the key already exists.
#[async_trait]
pub trait SentLedger: Send + Sync + 'static {
    /// Returns `true` if a reminder with this key was already recorded.
    async fn was_sent(&self, key: &ReminderKey) -> Result<bool, HearthError>;

    /// Records the key, ignoring duplicates.
    async fn record_sent(&self, key: &ReminderKey) -> Result<(), HearthError>;

    /// Deletes rows recorded strictly before `before`. Returns the number removed.
    async fn cleanup(&self, before: DateTime<Utc>) -> Result<u64, HearthError>;
}
