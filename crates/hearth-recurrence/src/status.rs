// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chore status evaluation on top of the occurrence expander.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use hearth_core::ChoreTask;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::expand::{localize, occurrences};
use crate::rule::RecurrenceRule;

/// Where a chore stands relative to its current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Overdue,
    NotDue,
}

impl TaskStatus {
    /// Pending and overdue chores still need doing.
    pub fn needs_attention(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

/// Result of [`compute_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: TaskStatus,
    /// Date of the current cycle; always `None` for one-off chores.
    pub due_date: Option<NaiveDate>,
}

impl StatusReport {
    fn without_due(status: TaskStatus) -> Self {
        Self {
            status,
            due_date: None,
        }
    }

    fn one_off(last_completion: Option<DateTime<Utc>>) -> Self {
        if last_completion.is_some() {
            Self::without_due(TaskStatus::Completed)
        } else {
            Self::without_due(TaskStatus::Pending)
        }
    }
}

/// Computes the status of `task` as seen on `today`.
///
/// Day boundaries are taken in `today`'s time zone. A malformed rule is
/// logged and the chore is treated as one-off.
pub fn compute_status<Tz: TimeZone>(
    task: &ChoreTask,
    last_completion: Option<DateTime<Utc>>,
    today: &DateTime<Tz>,
) -> StatusReport {
    let Some(rule) = recurring_rule(task) else {
        return StatusReport::one_off(last_completion);
    };

    let tz = today.timezone();
    let today_date = today.date_naive();
    let (Some(end_of_today), Some(window_end)) = (
        start_of_day(&tz, today_date, 1),
        start_of_day(&tz, today_date, 2),
    ) else {
        return StatusReport::without_due(TaskStatus::NotDue);
    };

    let created = task.created_at.with_timezone(&tz);
    let current_due = occurrences(&rule, &created, &created, &created, &window_end)
        .take_while(|occ| occ.start < end_of_today)
        .last()
        .map(|occ| occ.start.date_naive());

    let Some(due) = current_due else {
        return StatusReport::without_due(TaskStatus::NotDue);
    };

    let completed =
        last_completion.is_some_and(|done| done.with_timezone(&tz).date_naive() >= due);
    let status = if completed {
        TaskStatus::Completed
    } else if due < today_date {
        TaskStatus::Overdue
    } else {
        TaskStatus::Pending
    };

    StatusReport {
        status,
        due_date: Some(due),
    }
}

/// Returns `true` if the chore has an occurrence on the calendar day of `date`.
///
/// One-off chores (and chores with a malformed rule) are due every day.
pub fn is_due_on_date<Tz: TimeZone>(task: &ChoreTask, date: &DateTime<Tz>) -> bool {
    let Some(rule) = recurring_rule(task) else {
        return true;
    };

    let tz = date.timezone();
    let day = date.date_naive();
    let (Some(from), Some(to)) = (start_of_day(&tz, day, 0), start_of_day(&tz, day, 1)) else {
        return false;
    };

    let created = task.created_at.with_timezone(&tz);
    occurrences(&rule, &created, &created, &from, &to)
        .next()
        .is_some()
}

fn recurring_rule(task: &ChoreTask) -> Option<RecurrenceRule> {
    if task.is_one_off() {
        return None;
    }
    match RecurrenceRule::parse(&task.recurrence_rule) {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!(
                task_id = task.id,
                rule = %task.recurrence_rule,
                error = %e,
                "malformed recurrence rule, treating chore as one-off"
            );
            None
        }
    }
}

/// Local midnight `days_ahead` days after `date`.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate, days_ahead: u64) -> Option<DateTime<Tz>> {
    let day = date.checked_add_days(Days::new(days_ahead))?;
    localize(tz, day.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chore(rule: &str, created_at: DateTime<Utc>) -> ChoreTask {
        ChoreTask {
            id: 9,
            title: "Water plants".into(),
            recurrence_rule: rule.into(),
            created_at,
            last_completion: None,
        }
    }

    #[test]
    fn one_off_chores_have_no_due_date() {
        let task = chore("", utc(2026, 1, 1, 0));
        let today = utc(2026, 2, 3, 12);
        assert_eq!(
            compute_status(&task, None, &today),
            StatusReport {
                status: TaskStatus::Pending,
                due_date: None
            }
        );
        assert_eq!(
            compute_status(&task, Some(today), &today).status,
            TaskStatus::Completed
        );
    }

    #[test]
    #[traced_test]
    fn malformed_rule_falls_back_to_one_off_and_warns() {
        let task = chore("FREQ=FORTNIGHTLY", utc(2026, 1, 1, 0));
        let report = compute_status(&task, None, &utc(2026, 2, 3, 12));
        assert_eq!(report.status, TaskStatus::Pending);
        assert_eq!(report.due_date, None);
        assert!(logs_contain("malformed recurrence rule"));
        assert!(is_due_on_date(&task, &utc(2026, 2, 3, 12)));
    }

    #[test]
    fn daily_chore_due_today_is_pending() {
        let task = chore("FREQ=DAILY", utc(2026, 2, 1, 8));
        let report = compute_status(&task, None, &utc(2026, 2, 3, 6));
        assert_eq!(report.status, TaskStatus::Pending);
        assert_eq!(report.due_date, Some(ymd(2026, 2, 3)));
    }

    #[test]
    fn completion_on_or_after_due_date_completes_cycle() {
        let task = chore("FREQ=WEEKLY", utc(2026, 1, 5, 9));
        let today = utc(2026, 2, 3, 12);
        let report = compute_status(&task, Some(utc(2026, 2, 2, 20)), &today);
        assert_eq!(report.status, TaskStatus::Completed);
        assert_eq!(report.due_date, Some(ymd(2026, 2, 2)));

        let stale = compute_status(&task, Some(utc(2026, 1, 30, 20)), &today);
        assert_eq!(stale.status, TaskStatus::Overdue);
    }

    #[test]
    fn chore_created_in_the_future_is_not_due() {
        let task = chore("FREQ=DAILY", utc(2026, 3, 1, 9));
        let report = compute_status(&task, None, &utc(2026, 2, 3, 12));
        assert_eq!(report, StatusReport::without_due(TaskStatus::NotDue));
    }

    #[test]
    fn chore_created_tomorrow_is_not_due_yet() {
        let task = chore("FREQ=DAILY", utc(2026, 2, 4, 9));
        let report = compute_status(&task, None, &utc(2026, 2, 3, 12));
        assert_eq!(report.status, TaskStatus::NotDue);
    }

    #[test]
    fn due_on_date_matches_rule_days() {
        let task = chore("FREQ=WEEKLY;BYDAY=MO,TH", utc(2026, 2, 2, 9));
        assert!(is_due_on_date(&task, &utc(2026, 2, 5, 23)));
        assert!(!is_due_on_date(&task, &utc(2026, 2, 4, 0)));
        assert!(is_due_on_date(&chore("", utc(2026, 2, 2, 9)), &utc(2030, 1, 1, 0)));
    }

    #[test]
    fn needs_attention_covers_pending_and_overdue() {
        assert!(TaskStatus::Pending.needs_attention());
        assert!(TaskStatus::Overdue.needs_attention());
        assert!(!TaskStatus::Completed.needs_attention());
        assert!(!TaskStatus::NotDue.needs_attention());
        assert_eq!(TaskStatus::NotDue.to_string(), "not_due");
    }
}
