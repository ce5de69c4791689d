// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push-subscription registry and per-user notification preferences.

use async_trait::async_trait;

use crate::error::HearthError;
use crate::types::{HouseholdId, ReminderKind, Target, UserId};

/// Registry of push targets grouped by household.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync + 'static {
    /// Households that currently have at least one push target.
    async fn list_households(&self) -> Result<Vec<HouseholdId>, HearthError>;

    /// Push targets of every member of a household.
    async fn list_targets(&self, household_id: HouseholdId) -> Result<Vec<Target>, HearthError>;

    /// Removes a target after its subscription expired.
    async fn remove_by_endpoint(&self, endpoint: &str) -> Result<(), HearthError>;
}

/// Per-user opt-in/opt-out for each notification kind.
#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Whether `user_id` wants notifications of `kind` for this household.
    ///
    /// Implementations return `true` when no preference row exists.
    async fn is_enabled(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        kind: ReminderKind,
    ) -> Result<bool, HearthError>;
}
