// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hearth household core.

use thiserror::Error;

/// Failure to parse recurrence rule text such as `FREQ=WEEKLY;BYDAY=MO,WE`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    /// The rule text was empty or only whitespace.
    #[error("recurrence rule is empty")]
    Empty,

    /// A `;`-separated part was not of the form `KEY=VALUE`.
    #[error("malformed rule part `{part}`, expected KEY=VALUE")]
    MalformedPart { part: String },

    /// The same key appeared twice.
    #[error("duplicate rule key `{key}`")]
    DuplicateKey { key: String },

    /// An unrecognized key appeared.
    #[error("unknown rule key `{key}`")]
    UnknownKey { key: String },

    /// No `FREQ` part was present.
    #[error("recurrence rule is missing FREQ")]
    MissingFreq,

    /// `FREQ` named an unsupported frequency.
    #[error("unknown frequency `{value}`")]
    UnknownFreq { value: String },

    /// `INTERVAL` was not a positive integer.
    #[error("INTERVAL must be a positive integer, got `{value}`")]
    InvalidInterval { value: String },

    /// `COUNT` was not a positive integer.
    #[error("COUNT must be a positive integer, got `{value}`")]
    InvalidCount { value: String },

    /// `BYDAY` contained a code other than SU, MO, TU, WE, TH, FR, SA.
    #[error("unknown weekday code `{code}`")]
    UnknownWeekday { code: String },

    /// `BYMONTHDAY` was not an integer in 1..=31.
    #[error("BYMONTHDAY must be in 1..=31, got `{value}`")]
    InvalidMonthDay { value: String },

    /// `UNTIL` matched neither `YYYYMMDDTHHMMSSZ` nor `YYYYMMDD`.
    #[error("UNTIL must be YYYYMMDDTHHMMSSZ or YYYYMMDD, got `{value}`")]
    InvalidUntil { value: String },

    /// Both `COUNT` and `UNTIL` were given.
    #[error("COUNT and UNTIL are mutually exclusive")]
    ConflictingLimits,

    /// `BYDAY` was given for a frequency other than weekly.
    #[error("BYDAY is only valid with FREQ=WEEKLY")]
    ByDayRequiresWeekly,

    /// `BYMONTHDAY` was given for a frequency other than monthly.
    #[error("BYMONTHDAY is only valid with FREQ=MONTHLY")]
    ByMonthDayRequiresMonthly,
}

/// Error reported by a [`Transport`](crate::traits::Transport) for one target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The push subscription is gone for good; the target should be removed.
    #[error("subscription expired")]
    SubscriptionExpired,

    /// Any other delivery failure.
    #[error("transient transport error: {message}")]
    Transient { message: String },
}

/// The primary error type used across Hearth collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum HearthError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed recurrence rule text.
    #[error("invalid recurrence rule: {0}")]
    RuleParse(#[from] RuleParseError),

    /// Delivery to a push target failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A backing store (ledger, registry, feed, preferences) failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A subscriber connection failed while reading or writing.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The surrounding context was cancelled during shutdown.
    #[error("operation cancelled by shutdown")]
    Cancelled,

    /// A rate limit rejected the request; the caller may retry later.
    #[error("rate limit exceeded for `{key}`")]
    RateLimited { key: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HearthError {
    /// Wraps a backing-store failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Returns `true` if the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Timeout { .. }
                | Self::Transport(TransportError::Transient { .. })
        )
    }
}
