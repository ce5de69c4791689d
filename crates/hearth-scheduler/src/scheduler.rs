// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic reminder scheduler.
//!
//! One worker ticks on a fixed interval. Each tick walks the households that
//! have push targets and, for each one, sends due calendar reminders and (at
//! the top of the hour) the daily chore summary. Every reminder is emitted at
//! most once per (household, kind, reference, lead time) through the
//! [`SentLedger`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use hearth_core::{
    Clock, HouseholdId, PreferenceStore, ReminderEvent, ReminderFeed, ReminderKey, ReminderKind,
    ReminderPayload, SentLedger, SubscriberRegistry, Transport, TransportError, UserId,
};
use hearth_recurrence::compute_status;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::payload;

/// Default time between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// The external services the scheduler reads from and delivers through.
#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub feed: Arc<dyn ReminderFeed>,
    pub registry: Arc<dyn SubscriberRegistry>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub transport: Arc<dyn Transport>,
    pub ledger: Arc<dyn SentLedger>,
}

/// Counts from one [`ReminderScheduler::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub households: usize,
    pub calendar_reminders: usize,
    pub chore_summaries: usize,
    /// Payloads accepted by the transport across all targets.
    pub deliveries: usize,
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Worker {
    deps: Collaborators,
    tick_interval: Duration,
}

/// Start/stop handle around the tick worker.
pub struct ReminderScheduler {
    worker: Arc<Worker>,
    running: Mutex<Option<Running>>,
}

impl ReminderScheduler {
    /// Intervals below one second are raised to one second.
    pub fn new(deps: Collaborators, tick_interval: Duration) -> Self {
        Self {
            worker: Arc::new(Worker {
                deps,
                tick_interval: tick_interval.max(Duration::from_secs(1)),
            }),
            running: Mutex::new(None),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.worker.tick_interval
    }

    /// Spawns the worker on a child of `parent`.
    ///
    /// Returns `false` (and does nothing) if a worker is already running.
    pub fn start(&self, parent: &CancellationToken) -> bool {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            info!("reminder scheduler already running");
            return false;
        }

        let cancel = parent.child_token();
        let worker = self.worker.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(worker.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // Skip the first immediate tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("reminder scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let report = worker.tick().await;
                        debug!(
                            households = report.households,
                            deliveries = report.deliveries,
                            "reminder tick complete"
                        );
                    }
                }
            }
        });

        *running = Some(Running { cancel, handle });
        info!(
            interval_secs = self.worker.tick_interval.as_secs(),
            "reminder scheduler started"
        );
        true
    }

    /// Cancels the worker and waits for it to exit. A later `start` begins fresh.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(Running { cancel, handle }) = running else {
            return;
        };
        cancel.cancel();
        if let Err(e) = handle.await {
            error!(error = %e, "reminder scheduler worker panicked");
        }
        info!("reminder scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Runs one tick immediately at the clock's current time.
    pub async fn tick(&self) -> TickReport {
        self.worker.tick().await
    }

    /// Fans a grocery update out to every household member except
    /// `exclude_user`. Not deduplicated. Returns the number of deliveries.
    pub async fn send_grocery_notification(
        &self,
        household_id: HouseholdId,
        exclude_user: UserId,
        item_name: &str,
    ) -> usize {
        let payload = payload::grocery_update(item_name);
        self.worker
            .fan_out(
                household_id,
                Some(exclude_user),
                ReminderKind::GroceryUpdate,
                &payload,
            )
            .await
            .unwrap_or(0)
    }
}

impl Worker {
    async fn tick(&self) -> TickReport {
        let now = self.deps.clock.now();
        let mut report = TickReport::default();

        let households = match self.deps.registry.list_households().await {
            Ok(h) => h,
            Err(e) => {
                error!(error = %e, "failed to list households, skipping tick");
                return report;
            }
        };
        report.households = households.len();
        if households.is_empty() {
            return report;
        }

        let mut events = self.upcoming_by_household(now).await;

        for household_id in households {
            for event in events.remove(&household_id).unwrap_or_default() {
                if let Some(delivered) = self.calendar_reminder(household_id, &event).await {
                    report.calendar_reminders += 1;
                    report.deliveries += delivered;
                }
            }
            if now.minute() == 0 {
                if let Some(delivered) = self.chore_summary(household_id, now).await {
                    report.chore_summaries += 1;
                    report.deliveries += delivered;
                }
            }
        }

        report
    }

    async fn upcoming_by_household(
        &self,
        now: DateTime<Utc>,
    ) -> HashMap<HouseholdId, Vec<ReminderEvent>> {
        let lookahead = TimeDelta::from_std(self.tick_interval).unwrap_or(TimeDelta::MAX);
        let until = now.checked_add_signed(lookahead).unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut grouped: HashMap<HouseholdId, Vec<ReminderEvent>> = HashMap::new();
        match self.deps.feed.upcoming_with_reminders(now, until).await {
            Ok(events) => {
                for event in events {
                    grouped.entry(event.household_id).or_default().push(event);
                }
            }
            Err(e) => warn!(error = %e, "failed to load upcoming reminders"),
        }
        grouped
    }

    /// Sends one calendar reminder unless already sent. Returns the number of
    /// deliveries, or `None` if nothing was attempted.
    async fn calendar_reminder(
        &self,
        household_id: HouseholdId,
        event: &ReminderEvent,
    ) -> Option<usize> {
        let key = ReminderKey::calendar(household_id, event.id, event.lead_minutes);
        if !self.should_send(&key).await {
            return None;
        }

        let payload = payload::calendar_reminder(event);
        let delivered = self
            .fan_out(household_id, None, ReminderKind::CalendarReminder, &payload)
            .await?;
        self.record(&key).await;
        info!(
            household_id = %household_id,
            event_id = event.id,
            lead_minutes = event.lead_minutes,
            delivered,
            "calendar reminder sent"
        );
        Some(delivered)
    }

    /// Sends today's chore summary unless already sent or nothing is due.
    async fn chore_summary(&self, household_id: HouseholdId, now: DateTime<Utc>) -> Option<usize> {
        let key = ReminderKey::chore_daily(household_id, now.date_naive());
        if !self.should_send(&key).await {
            return None;
        }

        let chores = match self.deps.feed.list_chores_for_household(household_id).await {
            Ok(chores) => chores,
            Err(e) => {
                warn!(household_id = %household_id, error = %e, "failed to list chores");
                return None;
            }
        };
        let due: Vec<&str> = chores
            .iter()
            .filter(|c| {
                compute_status(c, c.last_completion, &now)
                    .status
                    .needs_attention()
            })
            .map(|c| c.title.as_str())
            .collect();
        if due.is_empty() {
            debug!(household_id = %household_id, "no chores due, skipping summary");
            return None;
        }

        let payload = payload::chore_summary(&due);
        let delivered = self
            .fan_out(household_id, None, ReminderKind::ChoreReminder, &payload)
            .await?;
        self.record(&key).await;
        info!(household_id = %household_id, chores = due.len(), delivered, "chore summary sent");
        Some(delivered)
    }

    /// Ledger gate. Read failures skip the reminder for this tick.
    async fn should_send(&self, key: &ReminderKey) -> bool {
        match self.deps.ledger.was_sent(key).await {
            Ok(true) => {
                debug!(reference_id = %key.reference_id, "reminder already sent");
                false
            }
            Ok(false) => true,
            Err(e) => {
                warn!(reference_id = %key.reference_id, error = %e, "ledger lookup failed, skipping reminder");
                false
            }
        }
    }

    async fn record(&self, key: &ReminderKey) {
        if let Err(e) = self.deps.ledger.record_sent(key).await {
            error!(reference_id = %key.reference_id, error = %e, "failed to record sent reminder");
        }
    }

    /// Delivers `payload` to every opted-in target of the household.
    ///
    /// Expired subscriptions are removed from the registry; other delivery
    /// failures are logged. Returns the number of successful deliveries, or
    /// `None` if the targets could not be listed and nothing was attempted.
    async fn fan_out(
        &self,
        household_id: HouseholdId,
        exclude_user: Option<UserId>,
        kind: ReminderKind,
        payload: &ReminderPayload,
    ) -> Option<usize> {
        let targets = match self.deps.registry.list_targets(household_id).await {
            Ok(targets) => targets,
            Err(e) => {
                warn!(household_id = %household_id, error = %e, "failed to list push targets, will retry next tick");
                return None;
            }
        };

        let mut delivered = 0;
        for target in targets {
            if exclude_user == Some(target.user_id) {
                continue;
            }
            match self
                .deps
                .preferences
                .is_enabled(target.user_id, household_id, kind)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    debug!(user_id = %target.user_id, kind = %kind, "notification disabled by preference");
                    continue;
                }
                Err(e) => {
                    warn!(user_id = %target.user_id, error = %e, "preference lookup failed, skipping target");
                    continue;
                }
            }

            match self.deps.transport.send(&target, payload).await {
                Ok(()) => delivered += 1,
                Err(TransportError::SubscriptionExpired) => {
                    info!(user_id = %target.user_id, "push subscription expired, removing target");
                    if let Err(e) = self.deps.registry.remove_by_endpoint(&target.endpoint).await {
                        warn!(user_id = %target.user_id, error = %e, "failed to remove expired target");
                    }
                }
                Err(e) => {
                    warn!(user_id = %target.user_id, error = %e, "push delivery failed");
                }
            }
        }
        Some(delivered)
    }
}
