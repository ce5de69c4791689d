// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hearth household service.
//!
//! This crate provides the error taxonomy, the collaborator traits through
//! which the recurrence engine, realtime hub, and reminder scheduler reach the
//! rest of the application, and the value types they exchange.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{HearthError, RuleParseError, TransportError};
pub use types::{
    ChoreTask, HouseholdId, ReminderEvent, ReminderKey, ReminderKind, ReminderPayload, Target,
    TargetKeys, UserId,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    Clock, Connection, PreferenceStore, ReminderFeed, SentLedger, SubscriberRegistry,
    SystemClock, Transport,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collaborator_traits_are_object_safe() {
        // Every collaborator is held behind `Arc<dyn _>` or `Box<dyn _>`; this
        // won't compile if a trait stops being dyn-compatible.
        fn _clock(_: &dyn Clock) {}
        fn _feed(_: &dyn ReminderFeed) {}
        fn _registry(_: &dyn SubscriberRegistry) {}
        fn _prefs(_: &dyn PreferenceStore) {}
        fn _transport(_: &dyn Transport) {}
        fn _ledger(_: &dyn SentLedger) {}
        fn _connection(_: &mut dyn Connection) {}
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
