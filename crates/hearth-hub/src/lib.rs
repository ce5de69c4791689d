// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime fan-out for Hearth.
//!
//! A [`Hub`] holds the live subscribers of the process and broadcasts
//! [`ChangeMessage`]s to them without ever blocking the producer. Each
//! subscriber is driven by a [`Session`] that writes its buffered frames to a
//! [`Connection`](hearth_core::Connection); [`ws`] provides the WebSocket one.

pub mod hub;
pub mod message;
pub mod session;
pub mod ws;

pub use hub::{BroadcastReport, DEFAULT_SEND_BUFFER_SIZE, Hub, SubscriberId, Subscription};
pub use message::ChangeMessage;
pub use session::{DEFAULT_WRITE_TIMEOUT, Session, SessionEnd};
pub use ws::{WsConnection, WsState, router, ws_handler};
