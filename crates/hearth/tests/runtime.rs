// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for runtime wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hearth::HearthRuntime;
use hearth_config::HearthConfig;
use hearth_core::{HearthError, HouseholdId, UserId};
use hearth_hub::ChangeMessage;
use hearth_scheduler::Collaborators;
use hearth_test_utils::{
    ManualClock, MockPreferenceStore, MockReminderFeed, MockSentLedger, MockSubscriberRegistry,
    MockTransport, target,
};
use tokio_util::sync::CancellationToken;

const HOME: HouseholdId = HouseholdId(1);

struct Fixture {
    clock: Arc<ManualClock>,
    feed: Arc<MockReminderFeed>,
    transport: Arc<MockTransport>,
    ledger: Arc<MockSentLedger>,
    runtime: HearthRuntime,
}

async fn fixture(config: HearthConfig) -> Fixture {
    let now: DateTime<Utc> = "2026-02-01T09:10:00Z".parse().unwrap();
    let clock = Arc::new(ManualClock::new(now));
    let feed = Arc::new(MockReminderFeed::new());
    let registry = Arc::new(MockSubscriberRegistry::new());
    let transport = Arc::new(MockTransport::new());
    let ledger = Arc::new(MockSentLedger::new());

    registry.add_target(HOME, target(10, "https://push/alice")).await;
    registry.add_target(HOME, target(11, "https://push/bob")).await;

    let runtime = HearthRuntime::new(
        config,
        Collaborators {
            clock: clock.clone(),
            feed: feed.clone(),
            registry,
            preferences: Arc::new(MockPreferenceStore::new()),
            transport: transport.clone(),
            ledger: ledger.clone(),
        },
    )
    .expect("valid config");

    Fixture {
        clock,
        feed,
        transport,
        ledger,
        runtime,
    }
}

// ---- Test 1: Grocery rate limiting ----

#[tokio::test]
async fn test_grocery_notifications_are_rate_limited_per_key() {
    let mut config = HearthConfig::default();
    config.rate_limit.grocery_limit = 2;
    config.rate_limit.grocery_window_secs = 60;
    let f = fixture(config).await;

    for _ in 0..2 {
        let delivered = f
            .runtime
            .notify_grocery("10.0.0.1", HOME, UserId(10), "Milk")
            .await
            .unwrap();
        assert_eq!(delivered, 1);
    }

    let err = f
        .runtime
        .notify_grocery("10.0.0.1", HOME, UserId(10), "Milk")
        .await
        .unwrap_err();
    assert!(matches!(&err, HearthError::RateLimited { key } if key == "10.0.0.1"));
    assert!(err.is_retryable());

    // Other keys have their own window.
    assert!(
        f.runtime
            .notify_grocery("10.0.0.2", HOME, UserId(10), "Milk")
            .await
            .is_ok()
    );

    f.clock.advance(TimeDelta::seconds(61));
    assert!(
        f.runtime
            .notify_grocery("10.0.0.1", HOME, UserId(10), "Milk")
            .await
            .is_ok()
    );
    assert_eq!(f.transport.sent_count().await, 4);
}

#[tokio::test]
async fn test_grocery_after_shutdown_is_cancelled() {
    let f = fixture(HearthConfig::default()).await;
    f.runtime.start(&CancellationToken::new());
    f.runtime.shutdown().await;

    let err = f
        .runtime
        .notify_grocery("10.0.0.1", HOME, UserId(10), "Milk")
        .await
        .unwrap_err();
    assert!(matches!(err, HearthError::Cancelled));
    assert!(!err.is_retryable());
    assert_eq!(f.transport.sent_count().await, 0);
}

// ---- Test 2: Change fan-out ----

#[tokio::test]
async fn test_publish_reaches_realtime_subscribers() {
    let f = fixture(HearthConfig::default()).await;
    let mut sub = f.runtime.hub().register();

    let report = f
        .runtime
        .publish(&ChangeMessage::new("chore", "completed", 3));
    assert_eq!(report.delivered, 1);

    let frame = sub.recv().await.unwrap();
    assert_eq!(
        &*frame,
        r#"{"type":"chore_completed","entity":"chore","action":"completed","id":3}"#
    );
}

#[tokio::test]
async fn test_hub_uses_configured_buffer_size() {
    let mut config = HearthConfig::default();
    config.hub.send_buffer_size = 4;
    let f = fixture(config).await;
    assert_eq!(f.runtime.hub().buffer_size(), 4);
    assert_eq!(f.runtime.scheduler().tick_interval(), Duration::from_secs(60));
}

// ---- Test 3: Lifecycle ----

#[tokio::test(start_paused = true)]
async fn test_start_ticks_and_shutdown_stops_everything() {
    let f = fixture(HearthConfig::default()).await;
    let mut sub = f.runtime.hub().register();
    let parent = CancellationToken::new();

    f.runtime.start(&parent);
    assert!(f.runtime.scheduler().is_running());

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(f.feed.upcoming_calls(), 1);

    tokio::time::sleep(Duration::from_secs(240)).await;
    assert_eq!(f.ledger.cleanup_cutoffs().await.len(), 1);
    let ticks = f.feed.upcoming_calls();
    assert_eq!(ticks, 5);

    f.runtime.shutdown().await;
    assert!(!f.runtime.scheduler().is_running());
    assert!(f.runtime.cancellation().is_cancelled());
    assert_eq!(f.runtime.hub().count(), 0);
    assert!(sub.recv().await.is_none());

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(f.feed.upcoming_calls(), ticks);
    assert_eq!(f.ledger.cleanup_cutoffs().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_parent_cancellation_propagates() {
    let f = fixture(HearthConfig::default()).await;
    let parent = CancellationToken::new();
    f.runtime.start(&parent);

    parent.cancel();
    tokio::time::timeout(Duration::from_secs(1), f.runtime.cancellation().cancelled())
        .await
        .expect("runtime token should follow its parent");

    f.runtime.shutdown().await;
    assert!(!f.runtime.scheduler().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_start_after_shutdown_is_refused() {
    let f = fixture(HearthConfig::default()).await;
    f.runtime.start(&CancellationToken::new());
    f.runtime.shutdown().await;

    f.runtime.start(&CancellationToken::new());
    assert!(!f.runtime.scheduler().is_running());

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(f.feed.upcoming_calls(), 0);
    assert!(f.ledger.cleanup_cutoffs().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_scheduler_never_ticks() {
    let mut config = HearthConfig::default();
    config.scheduler.enabled = false;
    let f = fixture(config).await;

    f.runtime.start(&CancellationToken::new());
    tokio::time::sleep(Duration::from_secs(180)).await;

    assert!(!f.runtime.scheduler().is_running());
    assert_eq!(f.feed.upcoming_calls(), 0);
    f.runtime.shutdown().await;
}

// ---- Test 4: Configuration ----

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let mut config = HearthConfig::default();
    config.hub.send_buffer_size = 0;
    config.logging.level = "chatty".into();

    let result = HearthRuntime::new(
        config,
        Collaborators {
            clock: Arc::new(ManualClock::new(Utc::now())),
            feed: Arc::new(MockReminderFeed::new()),
            registry: Arc::new(MockSubscriberRegistry::new()),
            preferences: Arc::new(MockPreferenceStore::new()),
            transport: Arc::new(MockTransport::new()),
            ledger: Arc::new(MockSentLedger::new()),
        },
    );
    match result {
        Err(HearthError::Config(message)) => {
            assert!(message.contains("hub.send_buffer_size"));
            assert!(message.contains("chatty"));
        }
        Err(other) => panic!("expected Config error, got {other}"),
        Ok(_) => panic!("invalid config was accepted"),
    }
}
