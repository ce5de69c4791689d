// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the recurrence engine, the hub, and the scheduler.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Identifier of a household (tenant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseholdId(pub i64);

impl fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a household member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of notification, used both as the ledger type and as the
/// per-user preference key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    CalendarReminder,
    ChoreReminder,
    GroceryUpdate,
}

/// Deduplication key for one emitted reminder.
///
/// The ledger records at most one row per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderKey {
    pub household_id: HouseholdId,
    pub kind: ReminderKind,
    /// Stable reference derived from the source, e.g. `event-42`.
    pub reference_id: String,
    pub lead_minutes: u32,
}

impl ReminderKey {
    /// Key for a calendar event reminder: `event-{id}` at the event's lead time.
    pub fn calendar(household_id: HouseholdId, event_id: i64, lead_minutes: u32) -> Self {
        Self {
            household_id,
            kind: ReminderKind::CalendarReminder,
            reference_id: format!("event-{event_id}"),
            lead_minutes,
        }
    }

    /// Key for the once-per-day chore summary: `chore-daily-YYYY-MM-DD`.
    pub fn chore_daily(household_id: HouseholdId, date: NaiveDate) -> Self {
        Self {
            household_id,
            kind: ReminderKind::ChoreReminder,
            reference_id: format!("chore-daily-{}", date.format("%Y-%m-%d")),
            lead_minutes: 0,
        }
    }
}

/// An upcoming calendar event that carries a reminder lead time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub lead_minutes: u32,
    pub household_id: HouseholdId,
}

impl ReminderEvent {
    /// The instant at which the reminder should fire (`start - lead`).
    pub fn trigger_at(&self) -> DateTime<Utc> {
        self.start - TimeDelta::minutes(i64::from(self.lead_minutes))
    }
}

/// Minimal chore projection used by the status evaluator and the daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreTask {
    pub id: i64,
    pub title: String,
    /// Recurrence rule text; empty for a one-off chore.
    #[serde(default)]
    pub recurrence_rule: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_completion: Option<DateTime<Utc>>,
}

impl ChoreTask {
    /// Returns `true` if the chore has no recurrence rule.
    pub fn is_one_off(&self) -> bool {
        self.recurrence_rule.trim().is_empty()
    }
}

/// Cryptographic keys of a web-push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetKeys {
    pub p256dh: String,
    pub auth: String,
}

/// An addressable push destination belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub user_id: UserId,
    pub endpoint: String,
    pub keys: TargetKeys,
}

/// Notification payload handed to a [`Transport`](crate::traits::Transport).
///
/// Wire format: `{"title":"…","body":"…","url":"/path","tag":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    pub tag: String,
}

impl ReminderPayload {
    /// Serializes the payload to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
