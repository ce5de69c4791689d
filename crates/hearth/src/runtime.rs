// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the Hearth components together and owns their lifecycle.

use std::sync::{Arc, Mutex};

use axum::Router;
use chrono::TimeDelta;
use hearth_config::HearthConfig;
use hearth_config::validation::validate_config;
use hearth_core::{HearthError, HouseholdId, UserId};
use hearth_hub::{BroadcastReport, ChangeMessage, Hub, WsState};
use hearth_scheduler::{Collaborators, Janitor, RateLimiter, ReminderScheduler};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Every long-lived Hearth component, built from one config.
///
/// Lifecycle: `new` → `start` → `shutdown`. Once shut down, `start` is a
/// no-op and `notify_grocery` returns [`HearthError::Cancelled`].
pub struct HearthRuntime {
    config: HearthConfig,
    hub: Arc<Hub>,
    scheduler: ReminderScheduler,
    rate_limiter: Arc<RateLimiter>,
    janitor: Arc<Janitor>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HearthRuntime {
    /// Validates `config` and builds every component. Nothing runs until `start`.
    pub fn new(config: HearthConfig, deps: Collaborators) -> Result<Self, HearthError> {
        if let Err(errors) = validate_config(&config) {
            let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(HearthError::Config(problems.join("; ")));
        }

        let hub = Arc::new(Hub::new(config.hub.send_buffer_size));
        let rate_limiter = Arc::new(RateLimiter::new(deps.clock.clone()));
        let janitor = Arc::new(Janitor::new(
            rate_limiter.clone(),
            deps.ledger.clone(),
            deps.clock.clone(),
            config.janitor.interval(),
            TimeDelta::days(i64::from(config.janitor.ledger_retention_days)),
        ));
        let scheduler = ReminderScheduler::new(deps, config.scheduler.tick_interval());

        Ok(Self {
            config,
            hub,
            scheduler,
            rate_limiter,
            janitor,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &HearthConfig {
        &self.config
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Token cancelled by [`shutdown`](Self::shutdown) or by the parent passed to `start`.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// `GET /ws` router for realtime subscribers. Sessions end on shutdown.
    pub fn ws_router(&self) -> Router {
        hearth_hub::router(WsState {
            hub: self.hub.clone(),
            write_timeout: self.config.hub.write_timeout(),
            shutdown: self.cancel.clone(),
        })
    }

    /// Starts the background workers. Cancelling `parent` shuts them down.
    pub fn start(&self, parent: &CancellationToken) {
        if self.cancel.is_cancelled() {
            warn!("runtime already shut down, not starting");
            return;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.is_empty() {
            debug!("runtime already started");
            return;
        }

        let parent = parent.clone();
        let own = self.cancel.clone();
        tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = parent.cancelled() => own.cancel(),
                _ = own.cancelled() => {}
            }
        }));

        if self.config.scheduler.enabled {
            self.scheduler.start(&self.cancel);
        } else {
            info!("reminder scheduler disabled by configuration");
        }
        tasks.push(self.janitor.clone().spawn(self.cancel.child_token()));
        info!("hearth runtime started");
    }

    /// Stops every worker, waits for them, and disconnects all subscribers.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.scheduler.stop().await;

        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "runtime task panicked");
            }
        }

        let disconnected = self.hub.close();
        info!(disconnected, "hearth runtime stopped");
    }

    /// Fans a change message out to every realtime subscriber.
    pub fn publish(&self, message: &ChangeMessage) -> BroadcastReport {
        self.hub.broadcast(message)
    }

    /// Sends a grocery update to the household, gated by the grocery rate
    /// limit for `rate_key`.
    ///
    /// Returns the number of deliveries, [`HearthError::RateLimited`], or
    /// [`HearthError::Cancelled`] once the runtime is shut down.
    pub async fn notify_grocery(
        &self,
        rate_key: &str,
        household_id: HouseholdId,
        exclude_user: UserId,
        item_name: &str,
    ) -> Result<usize, HearthError> {
        if self.cancel.is_cancelled() {
            return Err(HearthError::Cancelled);
        }
        let limits = &self.config.rate_limit;
        if !self
            .rate_limiter
            .allow(rate_key, limits.grocery_limit, limits.grocery_window())
        {
            debug!(rate_key, "grocery notification rate limited");
            return Err(HearthError::RateLimited {
                key: rate_key.to_string(),
            });
        }
        Ok(self
            .scheduler
            .send_grocery_notification(household_id, exclude_user, item_name)
            .await)
    }
}
