// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default notifier: structured log emission.
//!
//! Real delivery (email, push) belongs to an external collaborator; this
//! implementation records each lifecycle event in the log stream so a
//! delivery worker can be attached later without touching the engine.

use async_trait::async_trait;
use tracing::info;

use confab_core::{ConfabError, NotificationEvent, Notifier};

/// Logs lifecycle events; a disabled instance drops them silently.
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), ConfabError> {
        if !self.enabled {
            return Ok(());
        }
        let payload = serde_json::to_string(&event).map_err(|e| ConfabError::Channel {
            message: format!("notification event did not serialize: {e}"),
            source: Some(Box::new(e)),
        })?;
        info!(event = %payload, "lifecycle notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enabled_notifier_accepts_events() {
        let notifier = LogNotifier::new(true);
        let event = NotificationEvent::SessionRequested {
            session_id: "s".into(),
            consultant_id: "k".into(),
            client_name: "Casey Client".into(),
            topic: "t".into(),
        };
        assert!(notifier.notify(event).await.is_ok());
    }

    #[tokio::test]
    async fn disabled_notifier_drops_events() {
        let notifier = LogNotifier::new(false);
        let event = NotificationEvent::SessionRejected {
            session_id: "s".into(),
            client_id: "c".into(),
            consultant_name: "Kim Consultant".into(),
            topic: "t".into(),
        };
        assert!(notifier.notify(event).await.is_ok());
    }
}
