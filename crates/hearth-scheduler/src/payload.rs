// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push payloads synthesized by the scheduler.

use hearth_core::{ReminderEvent, ReminderPayload};

pub fn calendar_reminder(event: &ReminderEvent) -> ReminderPayload {
    ReminderPayload {
        title: "Calendar Reminder".to_string(),
        body: format!("{} starts in {} minutes", event.title, event.lead_minutes),
        url: "/calendar".to_string(),
        tag: format!("calendar-{}", event.id),
    }
}

/// Daily summary listing the titles of chores due today.
pub fn chore_summary(titles: &[&str]) -> ReminderPayload {
    ReminderPayload {
        title: "Today's Chores".to_string(),
        body: format!(
            "You have {} chore(s) due today: {}",
            titles.len(),
            titles.join(", ")
        ),
        url: "/chores".to_string(),
        tag: "chores-daily".to_string(),
    }
}

pub fn grocery_update(item: &str) -> ReminderPayload {
    ReminderPayload {
        title: "Grocery List Updated".to_string(),
        body: format!("{item} was added to the grocery list"),
        url: "/groceries".to_string(),
        tag: "grocery-update".to_string(),
    }
}
