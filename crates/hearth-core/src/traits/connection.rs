// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-level connection owned by one realtime subscriber session.

use async_trait::async_trait;

use crate::error::HearthError;

/// A bidirectional client connection (WebSocket, SSE stream, test double).
///
/// A session owns its connection exclusively, so methods take `&mut self`.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Writes one serialized message to the client.
    async fn send_text(&mut self, text: &str) -> Result<(), HearthError>;

    /// Waits for the next inbound frame. Returns `None` once the client has
    /// closed the connection.
    async fn recv(&mut self) -> Option<String>;

    /// Closes the connection. Closing twice is allowed.
    async fn close(&mut self) -> Result<(), HearthError>;
}
