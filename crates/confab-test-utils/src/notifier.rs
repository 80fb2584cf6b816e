// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A notifier that records every emitted event for assertions.

use async_trait::async_trait;
use confab_core::{ConfabError, NotificationEvent, Notifier};
use tokio::sync::Mutex;

/// Records events instead of delivering them. Optionally fails every
/// emission to exercise the log-and-suppress path.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every emission errors.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of the recorded events.
    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), ConfabError> {
        if self.fail {
            return Err(ConfabError::Channel {
                message: "notifier wired to fail".to_string(),
                source: None,
            });
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}
