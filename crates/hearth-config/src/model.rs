// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` and every field has a
//! default, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Hearth configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Change-broadcast hub settings.
    #[serde(default)]
    pub hub: HubConfig,

    /// Reminder scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Limits for ad-hoc notifications.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Background cleanup settings.
    #[serde(default)]
    pub janitor: JanitorConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`. `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Per-subscriber queue capacity. Messages beyond it are dropped for that subscriber.
    #[serde(default = "default_send_buffer_size")]
    pub send_buffer_size: usize,

    /// Seconds a single socket write may take before the session is closed.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: default_send_buffer_size(),
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

impl HubConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

fn default_send_buffer_size() -> usize {
    16
}

fn default_write_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_tick_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Grocery notifications allowed per key within one window.
    #[serde(default = "default_grocery_limit")]
    pub grocery_limit: u32,

    #[serde(default = "default_grocery_window_secs")]
    pub grocery_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            grocery_limit: default_grocery_limit(),
            grocery_window_secs: default_grocery_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn grocery_window(&self) -> Duration {
        Duration::from_secs(self.grocery_window_secs)
    }
}

fn default_grocery_limit() -> u32 {
    10
}

fn default_grocery_window_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JanitorConfig {
    #[serde(default = "default_janitor_interval_secs")]
    pub interval_secs: u64,

    /// Days a sent-ledger row is kept before cleanup removes it.
    #[serde(default = "default_ledger_retention_days")]
    pub ledger_retention_days: u32,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_janitor_interval_secs(),
            ledger_retention_days: default_ledger_retention_days(),
        }
    }
}

impl JanitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_janitor_interval_secs() -> u64 {
    300
}

fn default_ledger_retention_days() -> u32 {
    30
}
