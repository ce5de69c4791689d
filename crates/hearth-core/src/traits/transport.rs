// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push delivery to a single target.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{ReminderPayload, Target};

/// Delivers a notification payload to one push target.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Posts `payload` to `target`.
    ///
    /// Returns [`TransportError::SubscriptionExpired`] when the target is gone
    /// for good and should be removed from the registry.
    async fn send(&self, target: &Target, payload: &ReminderPayload) -> Result<(), TransportError>;
}
