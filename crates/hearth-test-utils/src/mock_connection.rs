// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock subscriber connection for session tests.
//!
//! `MockConnection` is moved into the session under test; the paired
//! `MockConnectionHandle` stays with the test to inject incoming frames,
//! script write failures, and inspect what was written.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use hearth_core::{Connection, HearthError};

struct Shared {
    frames: Mutex<Vec<String>>,
    close_calls: AtomicUsize,
    fail_writes: AtomicBool,
    stall_writes: AtomicBool,
}

/// Connection half handed to the code under test.
pub struct MockConnection {
    shared: Arc<Shared>,
    incoming: mpsc::UnboundedReceiver<String>,
}

/// Test-side handle of a [`MockConnection`].
pub struct MockConnectionHandle {
    shared: Arc<Shared>,
    incoming: std::sync::Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl MockConnection {
    /// Creates a connected pair.
    pub fn pair() -> (Self, MockConnectionHandle) {
        let shared = Arc::new(Shared {
            frames: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            stall_writes: AtomicBool::new(false),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                shared: shared.clone(),
                incoming: rx,
            },
            MockConnectionHandle {
                shared,
                incoming: std::sync::Mutex::new(Some(tx)),
            },
        )
    }
}

impl MockConnectionHandle {
    /// Frames successfully written by the session, in order.
    pub async fn frames(&self) -> Vec<String> {
        self.shared.frames.lock().await.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.shared.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }

    /// Delivers a frame as if the remote peer sent it.
    pub fn push_incoming(&self, text: &str) {
        let guard = self.incoming.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(text.to_string());
        }
    }

    /// Simulates the remote peer going away; `recv` then yields `None`.
    pub fn hang_up(&self) {
        self.incoming
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    /// Every subsequent write fails immediately.
    pub fn fail_writes(&self) {
        self.shared.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Every subsequent write never completes.
    pub fn stall_writes(&self) {
        self.shared.stall_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn send_text(&mut self, text: &str) -> Result<(), HearthError> {
        if self.shared.stall_writes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(HearthError::Connection {
                message: "injected write failure".into(),
            });
        }
        self.shared.frames.lock().await.push(text.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Option<String> {
        self.incoming.recv().await
    }

    async fn close(&mut self) -> Result<(), HearthError> {
        self.shared.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
