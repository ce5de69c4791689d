// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic cleanup of expired rate-limit windows and old ledger rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use hearth_core::{Clock, SentLedger};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::rate_limit::RateLimiter;

/// Result of one [`Janitor::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rate_limit_windows: usize,
    pub ledger_rows: u64,
}

pub struct Janitor {
    rate_limiter: Arc<RateLimiter>,
    ledger: Arc<dyn SentLedger>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    retention: TimeDelta,
}

impl Janitor {
    /// `retention` is how long ledger rows are kept after being recorded.
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        ledger: Arc<dyn SentLedger>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        retention: TimeDelta,
    ) -> Self {
        Self {
            rate_limiter,
            ledger,
            clock,
            interval: interval.max(Duration::from_secs(1)),
            retention,
        }
    }

    /// Runs one cleanup pass. Ledger failures are logged and reported as zero rows.
    pub async fn sweep(&self) -> SweepReport {
        let rate_limit_windows = self.rate_limiter.cleanup();

        let cutoff = self.clock.now() - self.retention;
        let ledger_rows = match self.ledger.cleanup(cutoff).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "ledger cleanup failed (non-fatal)");
                0
            }
        };

        debug!(rate_limit_windows, ledger_rows, "janitor sweep complete");
        SweepReport {
            rate_limit_windows,
            ledger_rows,
        }
    }

    /// Spawns the sweep loop; it exits when `cancel` fires.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            // Skip the first immediate tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.sweep().await;
                    }
                    _ = cancel.cancelled() => {
                        info!("janitor shutting down");
                        break;
                    }
                }
            }
        })
    }
}
