// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-subscriber send loop.
//!
//! A session owns one connection and the receive side of one hub
//! subscription. It forwards buffered frames to the connection in order and
//! ends on cancellation, on a closed buffer, on peer hang-up, or on the first
//! failed or slow write.

use std::sync::Arc;
use std::time::Duration;

use hearth_core::{Connection, HearthError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::hub::{Hub, SubscriberId, Subscription};

/// Default deadline for writing one frame.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Cancelled,
    BufferClosed,
    PeerClosed,
    WriteFailed,
    WriteTimedOut,
}

/// One live subscriber bound to its connection.
pub struct Session<C: Connection> {
    hub: Arc<Hub>,
    subscription: Subscription,
    conn: C,
    write_timeout: Duration,
}

impl<C: Connection> Session<C> {
    /// Registers a new subscriber on `hub` for `conn`.
    pub fn new(hub: Arc<Hub>, conn: C, write_timeout: Duration) -> Self {
        let subscription = hub.register();
        Self {
            hub,
            subscription,
            conn,
            write_timeout,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.subscription.id()
    }

    /// Drives the session until it ends, then unregisters and closes the
    /// connection.
    pub async fn run(self, cancel: CancellationToken) -> SessionEnd {
        let Session {
            hub,
            mut subscription,
            mut conn,
            write_timeout,
        } = self;
        let id = subscription.id();

        let end = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break SessionEnd::Cancelled,

                frame = subscription.recv() => {
                    let Some(frame) = frame else {
                        break SessionEnd::BufferClosed;
                    };
                    match tokio::time::timeout(write_timeout, conn.send_text(&frame)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            warn!(subscriber_id = %id, error = %e, "write failed, dropping subscriber");
                            break SessionEnd::WriteFailed;
                        }
                        Err(_) => {
                            let e = HearthError::Timeout { duration: write_timeout };
                            warn!(subscriber_id = %id, error = %e, "write stalled, dropping subscriber");
                            break SessionEnd::WriteTimedOut;
                        }
                    }
                }

                incoming = conn.recv() => match incoming {
                    Some(text) => debug!(subscriber_id = %id, len = text.len(), "discarding incoming frame"),
                    None => break SessionEnd::PeerClosed,
                },
            }
        };

        hub.unregister(id);
        if let Err(e) = conn.close().await {
            debug!(subscriber_id = %id, error = %e, "error closing connection");
        }
        info!(subscriber_id = %id, reason = ?end, "session ended");
        end
    }
}
