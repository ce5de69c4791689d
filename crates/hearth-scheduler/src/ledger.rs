// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`SentLedger`] for embedding without a database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use hearth_core::{Clock, HearthError, ReminderKey, SentLedger};

/// Ledger rows keyed by reminder tuple, stamped with the time of first recording.
pub struct MemorySentLedger {
    rows: DashMap<ReminderKey, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl MemorySentLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl SentLedger for MemorySentLedger {
    async fn was_sent(&self, key: &ReminderKey) -> Result<bool, HearthError> {
        Ok(self.rows.contains_key(key))
    }

    async fn record_sent(&self, key: &ReminderKey) -> Result<(), HearthError> {
        let now = self.clock.now();
        self.rows.entry(key.clone()).or_insert(now);
        Ok(())
    }

    async fn cleanup(&self, before: DateTime<Utc>) -> Result<u64, HearthError> {
        let start = self.rows.len();
        self.rows.retain(|_, recorded_at| *recorded_at >= before);
        Ok(start.saturating_sub(self.rows.len()) as u64)
    }
}
