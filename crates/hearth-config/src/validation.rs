// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks serde cannot express. All failures are collected.

use crate::diagnostic::ConfigError;
use crate::model::HearthConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &HearthConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut require_positive = |name: &str, value: u64| {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be greater than zero"),
            });
        }
    };

    require_positive("hub.send_buffer_size", config.hub.send_buffer_size as u64);
    require_positive("hub.write_timeout_secs", config.hub.write_timeout_secs);
    require_positive(
        "scheduler.tick_interval_secs",
        config.scheduler.tick_interval_secs,
    );
    require_positive(
        "rate_limit.grocery_limit",
        u64::from(config.rate_limit.grocery_limit),
    );
    require_positive(
        "rate_limit.grocery_window_secs",
        config.rate_limit.grocery_window_secs,
    );
    require_positive("janitor.interval_secs", config.janitor.interval_secs);
    require_positive(
        "janitor.ledger_retention_days",
        u64::from(config.janitor.ledger_retention_days),
    );

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
