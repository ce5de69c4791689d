// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window rate limiter keyed by an arbitrary string (usually a remote IP).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hearth_core::Clock;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    expires_at: DateTime<Utc>,
}

/// In-memory fixed-window counters behind a single mutex.
///
/// A window starts on the first call for a key and is replaced, not
/// extended, by the first call after it expires.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Counts one call for `key` and reports whether it is within `limit`
    /// calls per `window`.
    pub fn allow(&self, key: &str, limit: u32, window: Duration) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        match windows.get_mut(key) {
            Some(entry) if now <= entry.expires_at => {
                entry.count = entry.count.saturating_add(1);
                entry.count <= limit
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        expires_at: window_end(now, window),
                    },
                );
                true
            }
        }
    }

    /// Drops every expired window. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, w| now <= w.expires_at);
        before - windows.len()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|w| now.checked_add_signed(w))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
