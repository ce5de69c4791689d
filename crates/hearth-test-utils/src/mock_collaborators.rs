// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mocks for the scheduler's collaborators.
//!
//! Each mock stores its state behind `tokio::sync::Mutex` and exposes async
//! accessors for assertions, mirroring how the real adapters are awaited.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use hearth_core::{
    ChoreTask, HearthError, HouseholdId, PreferenceStore, ReminderEvent, ReminderFeed, ReminderKey,
    ReminderKind, ReminderPayload, SentLedger, SubscriberRegistry, Target, TargetKeys,
    Transport, TransportError, UserId,
};

/// Builds a push target with placeholder keys.
pub fn target(user_id: i64, endpoint: &str) -> Target {
    Target {
        user_id: UserId(user_id),
        endpoint: endpoint.to_string(),
        keys: TargetKeys {
            p256dh: format!("p256dh-{user_id}"),
            auth: format!("auth-{user_id}"),
        },
    }
}

fn injected(what: &str) -> HearthError {
    HearthError::Internal(format!("injected {what} failure"))
}

// --- Reminder feed ---

/// Scripted events and chores.
#[derive(Default)]
pub struct MockReminderFeed {
    events: Mutex<Vec<ReminderEvent>>,
    chores: Mutex<HashMap<HouseholdId, Vec<ChoreTask>>>,
    upcoming_calls: AtomicUsize,
    ignore_window: AtomicBool,
    fail_upcoming: AtomicBool,
    fail_chores: AtomicBool,
}

impl MockReminderFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_event(&self, event: ReminderEvent) {
        self.events.lock().await.push(event);
    }

    pub async fn set_chores(&self, household_id: HouseholdId, chores: Vec<ChoreTask>) {
        self.chores.lock().await.insert(household_id, chores);
    }

    /// Returns every event from `upcoming_with_reminders` regardless of the
    /// requested window, as a lagging store might.
    pub fn ignore_window(&self, ignore: bool) {
        self.ignore_window.store(ignore, Ordering::SeqCst);
    }

    /// Makes `upcoming_with_reminders` fail until reset.
    pub fn fail_upcoming(&self, fail: bool) {
        self.fail_upcoming.store(fail, Ordering::SeqCst);
    }

    /// Makes `list_chores_for_household` fail until reset.
    pub fn fail_chores(&self, fail: bool) {
        self.fail_chores.store(fail, Ordering::SeqCst);
    }

    pub fn upcoming_calls(&self) -> usize {
        self.upcoming_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReminderFeed for MockReminderFeed {
    async fn upcoming_with_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReminderEvent>, HearthError> {
        self.upcoming_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upcoming.load(Ordering::SeqCst) {
            return Err(injected("feed"));
        }
        let ignore_window = self.ignore_window.load(Ordering::SeqCst);
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .filter(|e| {
                let trigger = e.trigger_at();
                ignore_window || (trigger >= from && trigger < to)
            })
            .cloned()
            .collect())
    }

    async fn list_chores_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<ChoreTask>, HearthError> {
        if self.fail_chores.load(Ordering::SeqCst) {
            return Err(injected("chore listing"));
        }
        Ok(self
            .chores
            .lock()
            .await
            .get(&household_id)
            .cloned()
            .unwrap_or_default())
    }
}

// --- Subscriber registry ---

/// Push targets per household, with removal tracking.
#[derive(Default)]
pub struct MockSubscriberRegistry {
    targets: Mutex<Vec<(HouseholdId, Target)>>,
    removed: Mutex<Vec<String>>,
    fail_list_targets: AtomicBool,
}

impl MockSubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_target(&self, household_id: HouseholdId, target: Target) {
        self.targets.lock().await.push((household_id, target));
    }

    /// Endpoints passed to `remove_by_endpoint`, in call order.
    pub async fn removed_endpoints(&self) -> Vec<String> {
        self.removed.lock().await.clone()
    }

    pub async fn target_count(&self) -> usize {
        self.targets.lock().await.len()
    }

    /// Makes `list_targets` fail until reset.
    pub fn fail_list_targets(&self, fail: bool) {
        self.fail_list_targets.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriberRegistry for MockSubscriberRegistry {
    async fn list_households(&self) -> Result<Vec<HouseholdId>, HearthError> {
        let households: BTreeSet<HouseholdId> =
            self.targets.lock().await.iter().map(|(h, _)| *h).collect();
        Ok(households.into_iter().collect())
    }

    async fn list_targets(&self, household_id: HouseholdId) -> Result<Vec<Target>, HearthError> {
        if self.fail_list_targets.load(Ordering::SeqCst) {
            return Err(injected("target listing"));
        }
        Ok(self
            .targets
            .lock()
            .await
            .iter()
            .filter(|(h, _)| *h == household_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn remove_by_endpoint(&self, endpoint: &str) -> Result<(), HearthError> {
        self.targets
            .lock()
            .await
            .retain(|(_, t)| t.endpoint != endpoint);
        self.removed.lock().await.push(endpoint.to_string());
        Ok(())
    }
}

// --- Preferences ---

/// Everything is enabled unless explicitly disabled.
#[derive(Default)]
pub struct MockPreferenceStore {
    disabled: Mutex<HashSet<(UserId, HouseholdId, ReminderKind)>>,
}

impl MockPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn disable(&self, user_id: UserId, household_id: HouseholdId, kind: ReminderKind) {
        self.disabled
            .lock()
            .await
            .insert((user_id, household_id, kind));
    }
}

#[async_trait]
impl PreferenceStore for MockPreferenceStore {
    async fn is_enabled(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        kind: ReminderKind,
    ) -> Result<bool, HearthError> {
        Ok(!self
            .disabled
            .lock()
            .await
            .contains(&(user_id, household_id, kind)))
    }
}

// --- Transport ---

/// Captures every send; individual endpoints can be scripted to fail.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<(Target, ReminderPayload)>>,
    failures: Mutex<HashMap<String, TransportError>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to `endpoint` returns `error` from now on.
    pub async fn fail_endpoint(&self, endpoint: &str, error: TransportError) {
        self.failures
            .lock()
            .await
            .insert(endpoint.to_string(), error);
    }

    /// Successful sends, in call order.
    pub async fn sent(&self) -> Vec<(Target, ReminderPayload)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Endpoints that received a payload, in call order.
    pub async fn sent_endpoints(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(t, _)| t.endpoint.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, target: &Target, payload: &ReminderPayload) -> Result<(), TransportError> {
        if let Some(err) = self.failures.lock().await.get(&target.endpoint) {
            return Err(err.clone());
        }
        self.sent
            .lock()
            .await
            .push((target.clone(), payload.clone()));
        Ok(())
    }
}

// --- Sent ledger ---

/// Set-backed ledger that counts every call.
#[derive(Default)]
pub struct MockSentLedger {
    rows: Mutex<HashSet<ReminderKey>>,
    was_sent_calls: AtomicUsize,
    record_sent_calls: AtomicUsize,
    cleanup_calls: Mutex<Vec<DateTime<Utc>>>,
    fail_was_sent: AtomicBool,
    fail_record_sent: AtomicBool,
}

impl MockSentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_sent_calls(&self) -> usize {
        self.was_sent_calls.load(Ordering::SeqCst)
    }

    pub fn record_sent_calls(&self) -> usize {
        self.record_sent_calls.load(Ordering::SeqCst)
    }

    /// Cutoffs passed to `cleanup`, in call order.
    pub async fn cleanup_cutoffs(&self) -> Vec<DateTime<Utc>> {
        self.cleanup_calls.lock().await.clone()
    }

    pub async fn contains(&self, key: &ReminderKey) -> bool {
        self.rows.lock().await.contains(key)
    }

    pub fn fail_was_sent(&self, fail: bool) {
        self.fail_was_sent.store(fail, Ordering::SeqCst);
    }

    pub fn fail_record_sent(&self, fail: bool) {
        self.fail_record_sent.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SentLedger for MockSentLedger {
    async fn was_sent(&self, key: &ReminderKey) -> Result<bool, HearthError> {
        self.was_sent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_was_sent.load(Ordering::SeqCst) {
            return Err(injected("ledger read"));
        }
        Ok(self.rows.lock().await.contains(key))
    }

    async fn record_sent(&self, key: &ReminderKey) -> Result<(), HearthError> {
        self.record_sent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_record_sent.load(Ordering::SeqCst) {
            return Err(injected("ledger write"));
        }
        self.rows.lock().await.insert(key.clone());
        Ok(())
    }

    async fn cleanup(&self, before: DateTime<Utc>) -> Result<u64, HearthError> {
        self.cleanup_calls.lock().await.push(before);
        Ok(0)
    }
}
