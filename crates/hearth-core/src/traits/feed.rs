// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of calendar events and chores that may need reminders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HearthError;
use crate::types::{ChoreTask, HouseholdId, ReminderEvent};

/// Supplies the scheduler with reminder candidates.
#[async_trait]
pub trait ReminderFeed: Send + Sync + 'static {
    /// Events whose trigger time (`start - lead`) falls in `[from, to)`.
    async fn upcoming_with_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReminderEvent>, HearthError>;

    /// All chores of a household, with their latest completion.
    async fn list_chores_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<ChoreTask>, HearthError>;
}
