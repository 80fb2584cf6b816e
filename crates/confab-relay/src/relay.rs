// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection relay logic.
//!
//! One [`RelayConnection`] exists per live (session, user) channel. The
//! transport layer authenticates the credential, calls
//! [`RelayConnection::authorize`] for the participant gate, then feeds
//! inbound frames to [`handle_frame`](RelayConnection::handle_frame) one
//! at a time and calls [`disconnect`](RelayConnection::disconnect) on
//! every exit path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use confab_core::{ConfabError, MarketStore, Message};

use crate::protocol::{frame_types, ServerEvent};
use crate::registry::{OutboundSender, RoomRegistry};

/// A live relay connection for one participant of one session.
pub struct RelayConnection {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn MarketStore>,
    session_id: String,
    user_id: String,
}

impl RelayConnection {
    /// Participant gate: the session must exist and the authenticated
    /// user must be one of its two participants. Runs after credential
    /// verification, before any room registration.
    pub async fn authorize(
        store: &Arc<dyn MarketStore>,
        session_id: &str,
        user_id: &str,
    ) -> Result<(), ConfabError> {
        let session = store
            .get_session(session_id)
            .await?
            .ok_or_else(|| ConfabError::NotFound(format!("session {session_id}")))?;
        if session.client_id != user_id && session.consultant_id != user_id {
            return Err(ConfabError::Forbidden(
                "not a participant of this session".to_string(),
            ));
        }
        Ok(())
    }

    /// Register the connection in the room and announce it to the other
    /// occupants.
    pub async fn join(
        registry: Arc<RoomRegistry>,
        store: Arc<dyn MarketStore>,
        session_id: String,
        user_id: String,
        sender: OutboundSender,
    ) -> Self {
        let count = registry.join(&session_id, &user_id, sender);
        let joined = ServerEvent::UserJoined {
            user_id: user_id.clone(),
            count,
        };
        registry
            .broadcast(&session_id, &joined.to_json(), Some(&user_id))
            .await;
        info!(session_id, user_id, occupants = count, "relay connected");

        Self {
            registry,
            store,
            session_id,
            user_id,
        }
    }

    /// Process one inbound frame.
    ///
    /// Signaling passes through verbatim; chat is persisted best-effort
    /// and re-broadcast without echoing the sender; unknown types are
    /// ignored without surfacing an error.
    pub async fn handle_frame(&self, raw: &str) {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    session_id = self.session_id.as_str(),
                    user_id = self.user_id.as_str(),
                    error = %e,
                    "ignoring unparseable frame"
                );
                return;
            }
        };
        let Some(kind) = value.get("type").and_then(|t| t.as_str()) else {
            debug!(session_id = self.session_id.as_str(), "ignoring untyped frame");
            return;
        };

        match kind {
            frame_types::OFFER | frame_types::ANSWER | frame_types::ICE_CANDIDATE => {
                // Opaque signaling metadata: relay byte-for-byte to the
                // other occupant(s).
                self.registry
                    .broadcast(&self.session_id, raw, Some(&self.user_id))
                    .await;
            }
            frame_types::CHAT => self.handle_chat(&value).await,
            frame_types::END_SESSION => {
                // The whole room, sender included; the status change
                // arrives separately through the lifecycle engine.
                let ended = ServerEvent::SessionEnded {
                    user_id: self.user_id.clone(),
                };
                self.registry
                    .broadcast(&self.session_id, &ended.to_json(), None)
                    .await;
            }
            other => {
                debug!(
                    session_id = self.session_id.as_str(),
                    frame_type = other,
                    "ignoring unknown frame type"
                );
            }
        }
    }

    async fn handle_chat(&self, value: &serde_json::Value) {
        let text = value
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        let timestamp_ms = value
            .get("timestamp")
            .and_then(|t| t.as_i64())
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let sent_at = chrono::DateTime::from_timestamp_millis(timestamp_ms)
            .unwrap_or_else(Utc::now);

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: self.session_id.clone(),
            sender_id: self.user_id.clone(),
            content: text.clone(),
            sent_at,
        };
        // Chat is best-effort durable: a storage failure must not block
        // delivery to the peer.
        if let Err(e) = self.store.insert_message(&message).await {
            warn!(
                session_id = self.session_id.as_str(),
                error = %e,
                "chat persistence failed; relaying anyway"
            );
        }

        let event = ServerEvent::Chat {
            user_id: self.user_id.clone(),
            text,
            timestamp: timestamp_ms,
        };
        self.registry
            .broadcast(&self.session_id, &event.to_json(), Some(&self.user_id))
            .await;
    }

    /// Deregister and announce departure. Must run on every exit path,
    /// clean or not.
    pub async fn disconnect(&self) {
        self.registry.leave(&self.session_id, &self.user_id);
        let left = ServerEvent::UserLeft {
            user_id: self.user_id.clone(),
        };
        self.registry
            .broadcast(&self.session_id, &left.to_json(), None)
            .await;
        info!(
            session_id = self.session_id.as_str(),
            user_id = self.user_id.as_str(),
            "relay disconnected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::SessionStatus;
    use confab_storage::SqliteStore;
    use confab_test_utils::{client_user, consultant_user, seeded_store};
    use tokio::sync::mpsc;

    async fn store_with_session() -> Arc<dyn MarketStore> {
        let sqlite: Arc<SqliteStore> =
            seeded_store(&[client_user("a", 50.0), consultant_user("b", Some(1.0))]).await;
        let store: Arc<dyn MarketStore> = sqlite;
        let session = confab_core::Session {
            id: "s1".to_string(),
            client_id: "a".to_string(),
            consultant_id: "b".to_string(),
            topic: "t".to_string(),
            description: None,
            status: SessionStatus::Accepted,
            created_at: Utc::now(),
            scheduled_at: None,
            duration_minutes: 15,
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_seconds: 0,
            cost_per_minute: 1.0,
            total_cost: 0.0,
            is_paid: false,
        };
        store.create_session(&session).await.unwrap();
        store
    }

    async fn joined_pair(
        registry: &Arc<RoomRegistry>,
        store: &Arc<dyn MarketStore>,
    ) -> (
        RelayConnection,
        mpsc::Receiver<String>,
        RelayConnection,
        mpsc::Receiver<String>,
    ) {
        let (tx_a, rx_a) = mpsc::channel(16);
        let (tx_b, rx_b) = mpsc::channel(16);
        let conn_a = RelayConnection::join(
            registry.clone(),
            store.clone(),
            "s1".to_string(),
            "a".to_string(),
            tx_a,
        )
        .await;
        let conn_b = RelayConnection::join(
            registry.clone(),
            store.clone(),
            "s1".to_string(),
            "b".to_string(),
            tx_b,
        )
        .await;
        (conn_a, rx_a, conn_b, rx_b)
    }

    fn parse(frame: String) -> serde_json::Value {
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn authorize_enforces_the_participant_gate() {
        let store = store_with_session().await;
        assert!(RelayConnection::authorize(&store, "s1", "a").await.is_ok());
        assert!(RelayConnection::authorize(&store, "s1", "b").await.is_ok());

        let err = RelayConnection::authorize(&store, "s1", "stranger")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfabError::Forbidden(_)));

        let err = RelayConnection::authorize(&store, "missing", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfabError::NotFound(_)));
    }

    #[tokio::test]
    async fn join_announces_to_the_peer_only() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (_conn_a, mut rx_a, _conn_b, _rx_b) = joined_pair(&registry, &store).await;

        // A was alone when joining; B's join is announced to A.
        let joined = parse(rx_a.try_recv().unwrap());
        assert_eq!(joined["type"], "user-joined");
        assert_eq!(joined["userId"], "b");
        assert_eq!(joined["count"], 2);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn chat_reaches_the_peer_without_echo_and_is_persisted() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, mut rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;
        let _ = rx_a.try_recv(); // drain the join announcement

        conn_a
            .handle_frame(r#"{"type":"chat","text":"hello there","timestamp":1767225600000}"#)
            .await;

        let chat = parse(rx_b.try_recv().unwrap());
        assert_eq!(chat["type"], "chat");
        assert_eq!(chat["userId"], "a");
        assert_eq!(chat["text"], "hello there");
        assert!(rx_a.try_recv().is_err(), "sender gets no echo");

        let persisted = store.list_messages("s1").await.unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].sender_id, "a");
        assert_eq!(persisted[0].content, "hello there");
        assert_eq!(persisted[0].sent_at.timestamp_millis(), 1_767_225_600_000);
    }

    #[tokio::test]
    async fn signaling_is_relayed_verbatim() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, _rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;

        let raw = r#"{"type":"offer","sdp":"v=0 o=- 46117","weird":["opaque",1]}"#;
        conn_a.handle_frame(raw).await;
        assert_eq!(rx_b.try_recv().unwrap(), raw, "byte-for-byte relay");

        // Nothing persisted for signaling.
        assert!(store.list_messages("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn end_session_reaches_the_whole_room() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, mut rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;
        let _ = rx_a.try_recv();

        conn_a.handle_frame(r#"{"type":"end-session"}"#).await;

        assert_eq!(parse(rx_a.try_recv().unwrap())["type"], "session-ended");
        assert_eq!(parse(rx_b.try_recv().unwrap())["type"], "session-ended");

        // The relay never touches session status.
        let session = store.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Accepted);
    }

    #[tokio::test]
    async fn unknown_and_malformed_frames_are_ignored() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, _rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;

        conn_a.handle_frame(r#"{"type":"telemetry","x":1}"#).await;
        conn_a.handle_frame("not json at all").await;
        conn_a.handle_frame(r#"{"text":"no type tag"}"#).await;

        assert!(rx_b.try_recv().is_err(), "nothing relayed");
    }

    #[tokio::test]
    async fn disconnect_deregisters_and_announces_user_left() {
        let store = store_with_session().await;
        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, _rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;

        conn_a.disconnect().await;
        assert_eq!(registry.occupants("s1"), 1);

        let left = parse(rx_b.try_recv().unwrap());
        assert_eq!(left["type"], "user-left");
        assert_eq!(left["userId"], "a");
    }

    #[tokio::test]
    async fn chat_in_one_session_never_leaks_to_another() {
        let store = store_with_session().await;
        // Second independent session with its own pair.
        store.create_user(&client_user("c", 10.0)).await.unwrap();
        store
            .create_user(&consultant_user("d", Some(1.0)))
            .await
            .unwrap();
        let s2 = confab_core::Session {
            id: "s2".to_string(),
            client_id: "c".to_string(),
            consultant_id: "d".to_string(),
            topic: "t2".to_string(),
            description: None,
            status: SessionStatus::Accepted,
            created_at: Utc::now(),
            scheduled_at: None,
            duration_minutes: 15,
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_seconds: 0,
            cost_per_minute: 1.0,
            total_cost: 0.0,
            is_paid: false,
        };
        store.create_session(&s2).await.unwrap();

        let registry = Arc::new(RoomRegistry::new());
        let (conn_a, _rx_a, _conn_b, mut rx_b) = joined_pair(&registry, &store).await;

        let (tx_c, mut rx_c) = mpsc::channel(16);
        let (tx_d, mut rx_d) = mpsc::channel(16);
        let _conn_c = RelayConnection::join(
            registry.clone(),
            store.clone(),
            "s2".to_string(),
            "c".to_string(),
            tx_c,
        )
        .await;
        let _conn_d = RelayConnection::join(
            registry.clone(),
            store.clone(),
            "s2".to_string(),
            "d".to_string(),
            tx_d,
        )
        .await;
        let _ = rx_c.try_recv(); // drain join announcement

        conn_a
            .handle_frame(r#"{"type":"chat","text":"private to s1"}"#)
            .await;

        assert_eq!(parse(rx_b.try_recv().unwrap())["type"], "chat");
        assert!(rx_c.try_recv().is_err(), "s2 client sees nothing");
        assert!(rx_d.try_recv().is_err(), "s2 consultant sees nothing");
    }
}
