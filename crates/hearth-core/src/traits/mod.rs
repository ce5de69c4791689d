// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The core never touches persistence or the network directly. Everything it
//! needs from the rest of the application comes through these traits, which
//! use `#[async_trait]` for dynamic dispatch compatibility.

pub mod clock;
pub mod connection;
pub mod feed;
pub mod ledger;
pub mod registry;
pub mod transport;

// Re-export all traits at the traits module level for convenience.
pub use clock::{Clock, SystemClock};
pub use connection::Connection;
pub use feed::ReminderFeed;
pub use ledger::SentLedger;
pub use registry::{PreferenceStore, SubscriberRegistry};
pub use transport::Transport;
