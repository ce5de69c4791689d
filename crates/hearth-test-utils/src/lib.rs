// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hearth.
//!
//! Provides deterministic mock implementations of every collaborator trait
//! in `hearth-core`, each recording how it was called so tests can assert on
//! side effects without a real store, push service, or socket.

pub mod mock_clock;
pub mod mock_connection;
pub mod mock_collaborators;

pub use mock_clock::ManualClock;
pub use mock_collaborators::{
    MockPreferenceStore, MockReminderFeed, MockSentLedger, MockSubscriberRegistry, MockTransport,
    target,
};
pub use mock_connection::{MockConnection, MockConnectionHandle};
