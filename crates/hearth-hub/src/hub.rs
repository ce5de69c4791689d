// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process broadcast hub with bounded per-subscriber buffers.
//!
//! Producers never block: each subscriber owns a bounded queue and a
//! broadcast that finds it full drops the message for that subscriber only.
//! Delivery is at-most-once and best-effort.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::message::ChangeMessage;

/// Default capacity of each subscriber's send buffer.
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 16;

/// Identity of one subscriber for the lifetime of its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Receiving side of a registered subscriber.
///
/// The buffer closes (and [`Subscription::recv`] returns `None`) once the
/// hub unregisters the subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<str>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next serialized message, or `None` after unregistration.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }
}

/// Per-call outcome of [`Hub::broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Set of live subscribers.
pub struct Hub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<str>>>>,
    buffer_size: usize,
}

impl Hub {
    /// Creates a hub whose subscribers buffer up to `buffer_size` messages.
    /// A zero size is raised to one.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Adds a new subscriber with a fresh identity and an empty buffer.
    pub fn register(&self) -> Subscription {
        let id = SubscriberId(Uuid::new_v4());
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let count = {
            let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            subscribers.insert(id, tx);
            subscribers.len()
        };
        info!(subscriber_id = %id, count, "subscriber registered");
        Subscription { id, rx }
    }

    /// Removes a subscriber and closes its buffer.
    ///
    /// Returns `false` if it was not registered; repeated calls are no-ops.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            (subscribers.remove(&id), subscribers.len())
        };
        // Dropping the only sender closes the buffer.
        match removed {
            Some(_sender) => {
                info!(subscriber_id = %id, count, "subscriber unregistered");
                true
            }
            None => false,
        }
    }

    /// Serializes `message` once and offers it to every subscriber without
    /// waiting. Full or closed buffers drop the message.
    pub fn broadcast(&self, message: &ChangeMessage) -> BroadcastReport {
        let payload: Arc<str> = match message.to_json() {
            Ok(json) => json.into(),
            Err(e) => {
                error!(message_type = message.message_type(), error = %e, "failed to serialize change message");
                return BroadcastReport::default();
            }
        };
        self.broadcast_raw(payload)
    }

    /// Offers an already-serialized frame to every subscriber.
    pub fn broadcast_raw(&self, payload: Arc<str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let subscribers = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        for (id, tx) in subscribers.iter() {
            match tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(subscriber_id = %id, "send buffer full, dropping message");
                }
                Err(TrySendError::Closed(_)) => {
                    report.dropped += 1;
                    debug!(subscriber_id = %id, "subscriber gone, dropping message");
                }
            }
        }
        report
    }

    /// Number of registered subscribers.
    pub fn count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Unregisters every subscriber; their sessions observe a closed buffer.
    pub fn close(&self) -> usize {
        let drained: Vec<SubscriberId> = {
            let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            subscribers.drain().map(|(id, _)| id).collect()
        };
        if !drained.is_empty() {
            info!(count = drained.len(), "hub closed, all subscribers unregistered");
        }
        drained.len()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i64) -> ChangeMessage {
        ChangeMessage::new("grocery", "created", id)
    }

    #[tokio::test]
    async fn register_broadcast_receive() {
        let hub = Hub::default();
        let mut sub = hub.register();
        assert_eq!(hub.count(), 1);

        let report = hub.broadcast(&msg(1));
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 0 });
        let frame = sub.recv().await.unwrap();
        assert!(frame.contains(r#""id":1"#));
    }

    #[tokio::test]
    async fn unregister_closes_buffer_once() {
        let hub = Hub::default();
        let mut sub = hub.register();
        hub.broadcast(&msg(1));

        assert!(hub.unregister(sub.id()));
        assert!(!hub.unregister(sub.id()));
        assert_eq!(hub.count(), 0);

        // Buffered messages drain before the close is observed.
        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }

    #[test]
    fn full_buffer_drops_without_blocking() {
        let hub = Hub::new(2);
        let _slow = hub.register();
        let mut fast = hub.register();

        for i in 1..=2 {
            assert_eq!(hub.broadcast(&msg(i)).delivered, 2);
            fast.rx.try_recv().unwrap();
        }
        let report = hub.broadcast(&msg(3));
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert!(fast.rx.try_recv().unwrap().contains(r#""id":3"#));
    }

    #[test]
    fn dropped_subscription_counts_as_dropped() {
        let hub = Hub::default();
        let sub = hub.register();
        drop(sub);
        let report = hub.broadcast(&msg(1));
        assert_eq!(report, BroadcastReport { delivered: 0, dropped: 1 });
    }

    #[tokio::test]
    async fn close_unregisters_everyone() {
        let hub = Hub::default();
        let mut a = hub.register();
        let mut b = hub.register();
        assert_eq!(hub.close(), 2);
        assert_eq!(hub.count(), 0);
        assert!(a.recv().await.is_none());
        assert!(b.recv().await.is_none());
    }

    #[test]
    fn zero_buffer_size_is_raised_to_one() {
        assert_eq!(Hub::new(0).buffer_size(), 1);
    }

    #[test]
    fn subscriber_ids_are_unique() {
        let hub = Hub::default();
        let a = hub.register();
        let b = hub.register();
        assert_ne!(a.id(), b.id());
    }
}
