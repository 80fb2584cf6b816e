// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification emitter seam.

use async_trait::async_trait;

use crate::error::ConfabError;
use crate::types::NotificationEvent;

/// Fire-and-forget delivery of lifecycle events.
///
/// Callers log and suppress any error; a broken notifier must never block
/// or fail the transition that emitted the event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<(), ConfabError>;
}
