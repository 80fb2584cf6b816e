// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket endpoint for the realtime relay.
//!
//! One connection per (session id, user id), addressed as
//! `GET /ws/session/{session_id}/{user_id}?token=<bearer>`.
//!
//! Connection setup is a three-stage gate, failing closed at each stage
//! with a policy-violation close and no room registration:
//! 1. a `token` query parameter must be present
//! 2. the credential must verify, yielding the authenticated user id
//! 3. the authenticated id must match the path user id, the session must
//!    exist, and the user must be one of its participants

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::warn;

use confab_core::ConfabError;
use confab_relay::RelayConnection;

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    token: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((session_id, user_id)): Path<(String, String)>,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, user_id, params.token))
}

/// Run the three-stage connection gate.
pub(crate) async fn gate(
    state: &AppState,
    session_id: &str,
    user_id: &str,
    token: Option<&str>,
) -> Result<(), ConfabError> {
    let token = token.ok_or_else(|| {
        ConfabError::Unauthenticated("missing token parameter".to_string())
    })?;
    let authenticated = state.verifier.verify(token).await?;
    if authenticated != user_id {
        return Err(ConfabError::Forbidden(
            "credential subject does not match the connection target".to_string(),
        ));
    }
    RelayConnection::authorize(&state.store, session_id, user_id).await
}

/// Handle one WebSocket connection end to end.
///
/// After the gate passes, a sender task pumps outbound frames from the
/// room registry to the socket while this task reads inbound frames one
/// at a time. The deregister/user-left sequence runs on every exit path.
async fn handle_socket(
    mut socket: WebSocket,
    state: AppState,
    session_id: String,
    user_id: String,
    token: Option<String>,
) {
    if let Err(e) = gate(&state, &session_id, &user_id, token.as_deref()).await {
        warn!(
            session_id = session_id.as_str(),
            user_id = user_id.as_str(),
            error = %e,
            "realtime connection rejected"
        );
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "policy violation".into(),
            })))
            .await;
        return;
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(64);

    // Forward room broadcasts to this socket.
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let connection = RelayConnection::join(
        state.registry.clone(),
        state.store.clone(),
        session_id,
        user_id,
        tx,
    )
    .await;

    // One frame at a time, in arrival order, until disconnect or error.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => connection.handle_frame(&text).await,
            Message::Close(_) => break,
            _ => {} // Binary, ping, pong: handled by the transport layer.
        }
    }

    // Guaranteed cleanup, clean close or not.
    connection.disconnect().await;
    sender_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use confab_config::model::RtcConfig;
    use confab_core::{MarketStore, Session, SessionStatus};
    use confab_engine::{AccountService, ReviewService, SessionEngine};
    use confab_relay::RoomRegistry;
    use confab_storage::SqliteStore;
    use confab_test_utils::{
        client_user, consultant_user, mint_token, seeded_store, RecordingNotifier,
    };

    use crate::auth::HmacTokenVerifier;

    const SECRET: &str = "a-secret-of-16ch";

    async fn state_with_session() -> AppState {
        let sqlite: Arc<SqliteStore> =
            seeded_store(&[client_user("a", 50.0), consultant_user("b", Some(1.0))]).await;
        let store: Arc<dyn MarketStore> = sqlite;
        store
            .create_session(&Session {
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
            })
            .await
            .unwrap();

        AppState {
            sessions: Arc::new(SessionEngine::new(
                store.clone(),
                Arc::new(RecordingNotifier::new()),
            )),
            accounts: Arc::new(AccountService::new(store.clone())),
            reviews: Arc::new(ReviewService::new(store.clone())),
            store,
            registry: Arc::new(RoomRegistry::new()),
            verifier: Arc::new(HmacTokenVerifier::new(Some(SECRET.to_string()))),
            rtc: RtcConfig::default(),
            verbose_errors: false,
            start_time: std::time::Instant::now(),
        }
    }

    #[tokio::test]
    async fn stage_one_missing_token_is_rejected() {
        let state = state_with_session().await;
        let err = gate(&state, "s1", "a", None).await.unwrap_err();
        assert!(matches!(err, ConfabError::Unauthenticated(_)));
        assert_eq!(state.registry.occupants("s1"), 0, "no room registration");
    }

    #[tokio::test]
    async fn stage_two_invalid_token_is_rejected() {
        let state = state_with_session().await;
        let err = gate(&state, "s1", "a", Some("a.not-a-real-tag"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfabError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn stage_three_subject_mismatch_is_rejected() {
        let state = state_with_session().await;
        // Valid credential for "b", but the connection claims to be "a".
        let token = mint_token(SECRET, "b");
        let err = gate(&state, "s1", "a", Some(&token)).await.unwrap_err();
        assert!(matches!(err, ConfabError::Forbidden(_)));
    }

    #[tokio::test]
    async fn stage_three_non_participant_is_rejected() {
        let state = state_with_session().await;
        state
            .store
            .create_user(&client_user("outsider", 0.0))
            .await
            .unwrap();
        let token = mint_token(SECRET, "outsider");
        let err = gate(&state, "s1", "outsider", Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfabError::Forbidden(_)));
    }

    #[tokio::test]
    async fn participants_pass_the_gate() {
        let state = state_with_session().await;
        for user in ["a", "b"] {
            let token = mint_token(SECRET, user);
            assert!(gate(&state, "s1", user, Some(&token)).await.is_ok());
        }
    }
}
