// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the reminder scheduler against mock collaborators.
//!
//! Each test builds an isolated `Harness`; tests are independent and
//! order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hearth_core::{
    ChoreTask, HouseholdId, ReminderEvent, ReminderKey, ReminderKind, TransportError, UserId,
};
use hearth_scheduler::{Collaborators, ReminderScheduler};
use hearth_test_utils::{
    ManualClock, MockPreferenceStore, MockReminderFeed, MockSentLedger, MockSubscriberRegistry,
    MockTransport, target,
};
use tokio_util::sync::CancellationToken;

const HOME: HouseholdId = HouseholdId(1);

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

struct Harness {
    clock: Arc<ManualClock>,
    feed: Arc<MockReminderFeed>,
    registry: Arc<MockSubscriberRegistry>,
    prefs: Arc<MockPreferenceStore>,
    transport: Arc<MockTransport>,
    ledger: Arc<MockSentLedger>,
    scheduler: ReminderScheduler,
}

impl Harness {
    async fn new(now: &str) -> Self {
        let clock = Arc::new(ManualClock::new(utc(now)));
        let feed = Arc::new(MockReminderFeed::new());
        let registry = Arc::new(MockSubscriberRegistry::new());
        let prefs = Arc::new(MockPreferenceStore::new());
        let transport = Arc::new(MockTransport::new());
        let ledger = Arc::new(MockSentLedger::new());

        registry.add_target(HOME, target(10, "https://push/alice")).await;
        registry.add_target(HOME, target(11, "https://push/bob")).await;

        let scheduler = ReminderScheduler::new(
            Collaborators {
                clock: clock.clone(),
                feed: feed.clone(),
                registry: registry.clone(),
                preferences: prefs.clone(),
                transport: transport.clone(),
                ledger: ledger.clone(),
            },
            Duration::from_secs(60),
        );

        Self {
            clock,
            feed,
            registry,
            prefs,
            transport,
            ledger,
            scheduler,
        }
    }

    async fn add_event(&self, id: i64, title: &str, start: &str, lead_minutes: u32) {
        self.feed
            .push_event(ReminderEvent {
                id,
                title: title.into(),
                start: utc(start),
                lead_minutes,
                household_id: HOME,
            })
            .await;
    }
}

fn chore(id: i64, title: &str, rule: &str, created_at: &str) -> ChoreTask {
    ChoreTask {
        id,
        title: title.into(),
        recurrence_rule: rule.into(),
        created_at: utc(created_at),
        last_completion: None,
    }
}

// ---- Test 1: Reminder dedup across ticks ----

#[tokio::test]
async fn test_calendar_reminder_sent_once_across_two_ticks() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;
    // Keep offering the event on the second tick so only the ledger can stop it.
    h.feed.ignore_window(true);

    let first = h.scheduler.tick().await;
    assert_eq!(first.calendar_reminders, 1);
    assert_eq!(first.deliveries, 2);
    assert_eq!(h.transport.sent_count().await, 2);
    assert_eq!(h.ledger.record_sent_calls(), 1);

    h.clock.advance(TimeDelta::seconds(60));
    let second = h.scheduler.tick().await;
    assert_eq!(second.calendar_reminders, 0);
    assert_eq!(h.transport.sent_count().await, 2);
    assert_eq!(h.ledger.record_sent_calls(), 1);
    assert_eq!(h.ledger.was_sent_calls(), 2);
    assert!(
        h.ledger
            .contains(&ReminderKey::calendar(HOME, 42, 30))
            .await
    );

    let (_, payload) = &h.transport.sent().await[0];
    assert_eq!(payload.title, "Calendar Reminder");
    assert_eq!(payload.body, "Dentist starts in 30 minutes");
    assert_eq!(payload.url, "/calendar");
    assert_eq!(payload.tag, "calendar-42");
}

#[tokio::test]
async fn test_second_tick_after_window_sends_nothing() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;

    h.scheduler.tick().await;
    h.clock.advance(TimeDelta::seconds(60));
    h.scheduler.tick().await;

    assert_eq!(h.transport.sent_count().await, 2);
    assert_eq!(h.ledger.record_sent_calls(), 1);
    assert_eq!(h.feed.upcoming_calls(), 2);
}

// ---- Test 2: Preferences and exclusions ----

#[tokio::test]
async fn test_disabled_preference_skips_target() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(7, "School pickup", "2026-02-01T10:00:00Z", 30).await;
    h.prefs
        .disable(UserId(11), HOME, ReminderKind::CalendarReminder)
        .await;

    h.scheduler.tick().await;
    assert_eq!(h.transport.sent_endpoints().await, vec!["https://push/alice"]);
}

#[tokio::test]
async fn test_grocery_notification_excludes_author_and_is_not_deduplicated() {
    let h = Harness::new("2026-02-01T09:00:00Z").await;

    let first = h
        .scheduler
        .send_grocery_notification(HOME, UserId(10), "Oat milk")
        .await;
    let second = h
        .scheduler
        .send_grocery_notification(HOME, UserId(10), "Oat milk")
        .await;

    assert_eq!((first, second), (1, 1));
    let sent = h.transport.sent().await;
    assert!(sent.iter().all(|(t, _)| t.endpoint == "https://push/bob"));
    assert_eq!(sent[0].1.body, "Oat milk was added to the grocery list");
    assert_eq!(sent[0].1.tag, "grocery-update");
    assert_eq!(h.ledger.was_sent_calls(), 0);
    assert_eq!(h.ledger.record_sent_calls(), 0);
}

#[tokio::test]
async fn test_grocery_respects_grocery_preference() {
    let h = Harness::new("2026-02-01T09:00:00Z").await;
    h.prefs
        .disable(UserId(11), HOME, ReminderKind::GroceryUpdate)
        .await;

    let delivered = h
        .scheduler
        .send_grocery_notification(HOME, UserId(10), "Eggs")
        .await;
    assert_eq!(delivered, 0);
}

// ---- Test 3: Transport failures ----

#[tokio::test]
async fn test_expired_subscription_is_removed_and_reminder_recorded() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;
    h.transport
        .fail_endpoint("https://push/bob", TransportError::SubscriptionExpired)
        .await;

    let report = h.scheduler.tick().await;
    assert_eq!(report.deliveries, 1);
    assert_eq!(h.registry.removed_endpoints().await, vec!["https://push/bob"]);
    assert_eq!(h.registry.target_count().await, 1);
    assert_eq!(h.ledger.record_sent_calls(), 1);
}

#[tokio::test]
async fn test_transient_failure_still_recorded() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;
    h.transport
        .fail_endpoint(
            "https://push/alice",
            TransportError::Transient {
                message: "502 bad gateway".into(),
            },
        )
        .await;

    let report = h.scheduler.tick().await;
    assert_eq!(report.deliveries, 1);
    assert!(h.registry.removed_endpoints().await.is_empty());
    assert_eq!(h.ledger.record_sent_calls(), 1);
}

// ---- Test 4: Ledger failures ----

#[tokio::test]
async fn test_ledger_read_failure_skips_reminder_this_tick() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;
    h.ledger.fail_was_sent(true);

    let report = h.scheduler.tick().await;
    assert_eq!(report.calendar_reminders, 0);
    assert_eq!(h.transport.sent_count().await, 0);
    assert_eq!(h.ledger.record_sent_calls(), 0);
}

#[tokio::test]
async fn test_feed_failure_does_not_abort_tick() {
    let h = Harness::new("2026-02-01T09:00:00Z").await;
    h.feed.fail_upcoming(true);
    h.feed
        .set_chores(HOME, vec![chore(1, "Dishes", "FREQ=DAILY", "2026-01-20T08:00:00Z")])
        .await;

    let report = h.scheduler.tick().await;
    assert_eq!(report.chore_summaries, 1);
}

// ---- Test 5: Daily chore summary ----

#[tokio::test]
async fn test_chore_summary_at_top_of_hour_once_per_day() {
    let h = Harness::new("2026-02-03T08:00:00Z").await;
    h.feed
        .set_chores(
            HOME,
            vec![
                chore(1, "Dishes", "FREQ=DAILY", "2026-01-20T08:00:00Z"),
                chore(2, "Recycling", "FREQ=WEEKLY", "2026-01-05T09:00:00Z"),
                chore(3, "Clean gutters", "FREQ=MONTHLY", "2026-02-10T09:00:00Z"),
            ],
        )
        .await;

    let report = h.scheduler.tick().await;
    assert_eq!(report.chore_summaries, 1);
    let sent = h.transport.sent().await;
    assert_eq!(sent.len(), 2);
    let payload = &sent[0].1;
    assert_eq!(payload.title, "Today's Chores");
    assert_eq!(payload.body, "You have 2 chore(s) due today: Dishes, Recycling");
    assert_eq!(payload.url, "/chores");
    assert_eq!(payload.tag, "chores-daily");
    assert!(
        h.ledger
            .contains(&ReminderKey::chore_daily(HOME, utc("2026-02-03T00:00:00Z").date_naive()))
            .await
    );

    h.clock.advance(TimeDelta::hours(1));
    assert_eq!(h.scheduler.tick().await.chore_summaries, 0);
    assert_eq!(h.transport.sent_count().await, 2);

    h.clock.set(utc("2026-02-04T07:00:00Z"));
    assert_eq!(h.scheduler.tick().await.chore_summaries, 1);
}

#[tokio::test]
async fn test_chore_summary_only_at_minute_zero() {
    let h = Harness::new("2026-02-03T08:05:00Z").await;
    h.feed
        .set_chores(HOME, vec![chore(1, "Dishes", "FREQ=DAILY", "2026-01-20T08:00:00Z")])
        .await;

    assert_eq!(h.scheduler.tick().await.chore_summaries, 0);
    assert_eq!(h.ledger.was_sent_calls(), 0);
}

#[tokio::test]
async fn test_no_due_chores_sends_and_records_nothing() {
    let h = Harness::new("2026-02-03T08:00:00Z").await;
    let mut done = chore(1, "Dishes", "FREQ=DAILY", "2026-01-20T08:00:00Z");
    done.last_completion = Some(utc("2026-02-03T07:30:00Z"));
    h.feed.set_chores(HOME, vec![done]).await;

    assert_eq!(h.scheduler.tick().await.chore_summaries, 0);
    assert_eq!(h.transport.sent_count().await, 0);
    assert_eq!(h.ledger.record_sent_calls(), 0);
}

// ---- Test 6: Registry failures ----

#[tokio::test]
async fn test_target_lookup_failure_retries_reminder_next_tick() {
    let h = Harness::new("2026-02-01T09:29:30Z").await;
    h.add_event(42, "Dentist", "2026-02-01T10:00:00Z", 30).await;
    h.feed.ignore_window(true);
    h.registry.fail_list_targets(true);

    let first = h.scheduler.tick().await;
    assert_eq!(first.calendar_reminders, 0);
    assert_eq!(first.deliveries, 0);
    assert_eq!(h.ledger.record_sent_calls(), 0);
    assert!(
        !h.ledger
            .contains(&ReminderKey::calendar(HOME, 42, 30))
            .await
    );

    h.registry.fail_list_targets(false);
    h.clock.advance(TimeDelta::seconds(60));
    let second = h.scheduler.tick().await;
    assert_eq!(second.calendar_reminders, 1);
    assert_eq!(h.transport.sent_count().await, 2);
    assert_eq!(h.ledger.record_sent_calls(), 1);
}

#[tokio::test]
async fn test_target_lookup_failure_leaves_chore_summary_unrecorded() {
    let h = Harness::new("2026-02-03T08:00:00Z").await;
    h.feed
        .set_chores(HOME, vec![chore(1, "Dishes", "FREQ=DAILY", "2026-01-20T08:00:00Z")])
        .await;
    h.registry.fail_list_targets(true);

    assert_eq!(h.scheduler.tick().await.chore_summaries, 0);
    assert_eq!(h.ledger.record_sent_calls(), 0);

    h.registry.fail_list_targets(false);
    h.clock.advance(TimeDelta::hours(1));
    assert_eq!(h.scheduler.tick().await.chore_summaries, 1);
    assert_eq!(h.transport.sent_count().await, 2);
}

#[tokio::test]
async fn test_grocery_with_failed_target_lookup_delivers_nothing() {
    let h = Harness::new("2026-02-01T09:00:00Z").await;
    h.registry.fail_list_targets(true);

    let delivered = h
        .scheduler
        .send_grocery_notification(HOME, UserId(10), "Bread")
        .await;
    assert_eq!(delivered, 0);
    assert_eq!(h.transport.sent_count().await, 0);
}

// ---- Test 7: Lifecycle ----

#[tokio::test(start_paused = true)]
async fn test_start_stop_restart() {
    let h = Harness::new("2026-02-01T09:00:30Z").await;
    let root = CancellationToken::new();

    assert!(h.scheduler.start(&root));
    assert!(!h.scheduler.start(&root));
    assert!(h.scheduler.is_running());

    // No tick before the first full interval.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.feed.upcoming_calls(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(h.feed.upcoming_calls(), 1);

    h.scheduler.stop().await;
    assert!(!h.scheduler.is_running());
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.feed.upcoming_calls(), 1);

    assert!(h.scheduler.start(&root));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(h.feed.upcoming_calls(), 2);

    root.cancel();
    h.scheduler.stop().await;
}

#[tokio::test]
async fn test_stop_without_start_is_noop() {
    let h = Harness::new("2026-02-01T09:00:30Z").await;
    h.scheduler.stop().await;
    assert!(!h.scheduler.is_running());
}
