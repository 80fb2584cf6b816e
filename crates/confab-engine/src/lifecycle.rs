// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session lifecycle state machine.
//!
//! States: pending -> accepted -> active -> completed, with
//! pending -> rejected and {pending, accepted, active} -> cancelled as
//! alternate terminal branches. Every transition is authorized against
//! the acting user and guarded by a conditional update at the store
//! layer, so racing callers resolve to exactly one winner.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use confab_core::{
    Availability, ConfabError, MarketStore, Message, NotificationEvent, Notifier, Session,
    SessionCompletion, SessionStatus, SessionView, User, UserRole,
};

use crate::{fetch_session, fetch_user};

/// Default estimate when the client doesn't give one.
const DEFAULT_DURATION_MINUTES: i64 = 15;

/// Input for a new session request.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub consultant_id: String,
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Enforces the session state machine and computes billing on completion.
pub struct SessionEngine {
    store: Arc<dyn MarketStore>,
    notifier: Arc<dyn Notifier>,
}

impl SessionEngine {
    pub fn new(store: Arc<dyn MarketStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create a session request in the pending state.
    ///
    /// The consultant's current rate is snapshotted into
    /// `cost_per_minute`; later rate changes never reprice this session.
    pub async fn request_session(
        &self,
        acting_user_id: &str,
        request: SessionRequest,
    ) -> Result<SessionView, ConfabError> {
        let client = fetch_user(&self.store, acting_user_id).await?;

        if client.role == UserRole::Consultant {
            return Err(ConfabError::InvalidRequest(
                "consultants cannot request sessions".to_string(),
            ));
        }
        if request.consultant_id == client.id {
            return Err(ConfabError::InvalidRequest(
                "cannot request a session with yourself".to_string(),
            ));
        }

        let consultant = self
            .store
            .get_user(&request.consultant_id)
            .await?
            .ok_or_else(|| {
                ConfabError::NotFound(format!("consultant {}", request.consultant_id))
            })?;

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            consultant_id: consultant.id.clone(),
            topic: request.topic,
            description: request.description,
            status: SessionStatus::Pending,
            created_at: Utc::now(),
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_seconds: 0,
            cost_per_minute: consultant.price_per_minute.unwrap_or(0.0),
            total_cost: 0.0,
            is_paid: false,
        };
        self.store.create_session(&session).await?;

        info!(
            session_id = %session.id,
            client_id = %client.id,
            consultant_id = %consultant.id,
            "session requested"
        );
        self.emit(NotificationEvent::SessionRequested {
            session_id: session.id.clone(),
            consultant_id: consultant.id.clone(),
            client_name: client.full_name(),
            topic: session.topic.clone(),
        })
        .await;

        Ok(SessionView::hydrate(session, &client, &consultant))
    }

    /// Consultant accepts a pending request.
    pub async fn accept_session(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        if session.consultant_id != acting_user_id {
            return Err(ConfabError::Forbidden(
                "only the consultant can accept this session".to_string(),
            ));
        }
        if session.status != SessionStatus::Pending {
            return Err(ConfabError::InvalidState(format!(
                "session is {}, not pending",
                session.status
            )));
        }

        let moved = self
            .store
            .transition_status(session_id, &[SessionStatus::Pending], SessionStatus::Accepted)
            .await?;
        if !moved {
            // Lost a race since the read above.
            return Err(ConfabError::InvalidState(
                "session is no longer pending".to_string(),
            ));
        }

        let session = fetch_session(&self.store, session_id).await?;
        let view = self.hydrate(session).await?;
        self.emit(NotificationEvent::SessionAccepted {
            session_id: view.session.id.clone(),
            client_id: view.session.client_id.clone(),
            consultant_name: format!(
                "{} {}",
                view.consultant.first_name, view.consultant.last_name
            ),
            topic: view.session.topic.clone(),
        })
        .await;
        Ok(view)
    }

    /// Consultant rejects a pending request.
    ///
    /// Restricted to pending, symmetric with accept.
    pub async fn reject_session(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        if session.consultant_id != acting_user_id {
            return Err(ConfabError::Forbidden(
                "only the consultant can reject this session".to_string(),
            ));
        }
        if session.status != SessionStatus::Pending {
            return Err(ConfabError::InvalidState(format!(
                "session is {}, not pending",
                session.status
            )));
        }

        let moved = self
            .store
            .transition_status(session_id, &[SessionStatus::Pending], SessionStatus::Rejected)
            .await?;
        if !moved {
            return Err(ConfabError::InvalidState(
                "session is no longer pending".to_string(),
            ));
        }

        let session = fetch_session(&self.store, session_id).await?;
        let view = self.hydrate(session).await?;
        self.emit(NotificationEvent::SessionRejected {
            session_id: view.session.id.clone(),
            client_id: view.session.client_id.clone(),
            consultant_name: format!(
                "{} {}",
                view.consultant.first_name, view.consultant.last_name
            ),
            topic: view.session.topic.clone(),
        })
        .await;
        Ok(view)
    }

    /// Enter (or re-enter) the live video phase.
    ///
    /// Idempotent for an already-active session so participants can
    /// reconnect. The client-side affordability check is a pre-flight
    /// gate, not a hold: nothing is debited until completion.
    pub async fn start_video(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        self.require_participant(&session, acting_user_id)?;

        match session.status {
            SessionStatus::Accepted | SessionStatus::Active => {}
            other => {
                return Err(ConfabError::InvalidState(format!(
                    "session must be accepted before video can start (currently {other})"
                )));
            }
        }

        if acting_user_id == session.client_id {
            let client = fetch_user(&self.store, acting_user_id).await?;
            let consultant = fetch_user(&self.store, &session.consultant_id).await?;
            let rate = consultant.price_per_minute.unwrap_or(0.0);
            if rate > 0.0 && client.credits < rate {
                return Err(ConfabError::PaymentRequired(format!(
                    "insufficient credits: rate is ${rate:.2}/min, balance is ${:.2}",
                    client.credits
                )));
            }
        }

        let moved = self
            .store
            .mark_video_started(session_id, Utc::now())
            .await?;
        if !moved {
            return Err(ConfabError::InvalidState(
                "session is no longer joinable".to_string(),
            ));
        }
        self.store
            .set_availability(&session.consultant_id, Availability::Busy)
            .await?;

        let session = fetch_session(&self.store, session_id).await?;
        info!(session_id = %session.id, "video started");
        self.hydrate(session).await
    }

    /// The general transition endpoint.
    ///
    /// Legal targets: accepted/rejected (consultant, from pending),
    /// cancelled (either participant, from any non-terminal state), and
    /// completed (either participant; triggers billing). Anything else is
    /// an invalid request, never a silent no-op.
    pub async fn update_status(
        &self,
        session_id: &str,
        acting_user_id: &str,
        target: SessionStatus,
    ) -> Result<SessionView, ConfabError> {
        match target {
            SessionStatus::Accepted => self.accept_session(session_id, acting_user_id).await,
            SessionStatus::Rejected => self.reject_session(session_id, acting_user_id).await,
            SessionStatus::Cancelled => self.cancel_session(session_id, acting_user_id).await,
            SessionStatus::Completed => self.complete_session(session_id, acting_user_id).await,
            SessionStatus::Pending => Err(ConfabError::InvalidRequest(
                "pending is not a valid transition target".to_string(),
            )),
            SessionStatus::Active => Err(ConfabError::InvalidRequest(
                "use the start-video operation to activate a session".to_string(),
            )),
        }
    }

    /// Either participant cancels a not-yet-terminal session.
    pub async fn cancel_session(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        self.require_participant(&session, acting_user_id)?;

        let moved = self
            .store
            .transition_status(
                session_id,
                &SessionStatus::NON_TERMINAL,
                SessionStatus::Cancelled,
            )
            .await?;
        if !moved {
            return Err(ConfabError::InvalidState(format!(
                "cannot cancel a {} session",
                session.status
            )));
        }
        self.store.reset_busy(&session.consultant_id).await?;

        let session = fetch_session(&self.store, session_id).await?;
        info!(session_id = %session.id, "session cancelled");
        self.hydrate(session).await
    }

    /// Either participant completes the session; billing applies at most
    /// once.
    ///
    /// Cost is wall-clock minutes since `actual_start_time` times the
    /// rate snapshot. If video never started the session completes with
    /// zero cost and no balance movement. Completing an
    /// already-completed session is a no-op that returns the session
    /// unchanged.
    pub async fn complete_session(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        self.require_participant(&session, acting_user_id)?;

        let ended_at = Utc::now();
        let (duration_seconds, cost) = match session.actual_start_time {
            Some(started_at) => {
                let elapsed_secs =
                    (ended_at - started_at).num_milliseconds() as f64 / 1000.0;
                let minutes = elapsed_secs / 60.0;
                (elapsed_secs.round() as i64, session.cost_per_minute * minutes)
            }
            None => (0, 0.0),
        };

        let completion = SessionCompletion {
            session_id: session.id.clone(),
            client_id: session.client_id.clone(),
            consultant_id: session.consultant_id.clone(),
            ended_at,
            duration_seconds,
            cost,
        };
        let applied = self.store.apply_completion(&completion).await?;

        let session = fetch_session(&self.store, session_id).await?;
        if !applied {
            // The conditional update refused: the session was already
            // terminal. Re-completing a completed session is the benign
            // double-submit case and stays a no-op; anything else is a
            // real state error.
            if session.status == SessionStatus::Completed {
                return self.hydrate(session).await;
            }
            return Err(ConfabError::InvalidState(format!(
                "cannot complete a {} session",
                session.status
            )));
        }

        info!(
            session_id = %session.id,
            total_cost = session.total_cost,
            duration_seconds = session.actual_duration_seconds,
            "session completed and billed"
        );
        self.emit(NotificationEvent::SessionCompleted {
            session_id: session.id.clone(),
            client_id: session.client_id.clone(),
            consultant_id: session.consultant_id.clone(),
            topic: session.topic.clone(),
            duration_minutes: session.actual_duration_seconds / 60,
            total_cost: session.total_cost,
        })
        .await;
        self.hydrate(session).await
    }

    /// Participant-only read with resolved participants.
    pub async fn get_session(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<SessionView, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        self.require_participant(&session, acting_user_id)?;
        self.hydrate(session).await
    }

    /// Sessions where the acting user participates, newest first.
    pub async fn list_sessions(
        &self,
        acting_user_id: &str,
        status: Option<SessionStatus>,
        limit: i64,
    ) -> Result<Vec<SessionView>, ConfabError> {
        let sessions = self
            .store
            .list_sessions_for_user(acting_user_id, status, limit)
            .await?;
        self.hydrate_all(sessions).await
    }

    /// Chat history, participant-only.
    pub async fn list_messages(
        &self,
        session_id: &str,
        acting_user_id: &str,
    ) -> Result<Vec<Message>, ConfabError> {
        let session = fetch_session(&self.store, session_id).await?;
        self.require_participant(&session, acting_user_id)?;
        self.store.list_messages(session_id).await
    }

    fn require_participant(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<(), ConfabError> {
        if session.client_id != user_id && session.consultant_id != user_id {
            return Err(ConfabError::Forbidden(
                "not a participant of this session".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve both participants into a display view.
    async fn hydrate(&self, session: Session) -> Result<SessionView, ConfabError> {
        let client = fetch_user(&self.store, &session.client_id).await?;
        let consultant = fetch_user(&self.store, &session.consultant_id).await?;
        Ok(SessionView::hydrate(session, &client, &consultant))
    }

    /// Resolve participants for a batch, fetching each user once.
    async fn hydrate_all(
        &self,
        sessions: Vec<Session>,
    ) -> Result<Vec<SessionView>, ConfabError> {
        let mut users: HashMap<String, User> = HashMap::new();
        for session in &sessions {
            for id in [&session.client_id, &session.consultant_id] {
                if !users.contains_key(id.as_str()) {
                    let user = fetch_user(&self.store, id).await?;
                    users.insert(id.clone(), user);
                }
            }
        }
        Ok(sessions
            .into_iter()
            .map(|session| {
                let client = &users[&session.client_id];
                let consultant = &users[&session.consultant_id];
                SessionView::hydrate(session, client, consultant)
            })
            .collect())
    }

    /// Fire-and-forget emission; failures are logged, never propagated.
    async fn emit(&self, event: NotificationEvent) {
        if let Err(e) = self.notifier.notify(event).await {
            warn!(error = %e, "notification emission failed");
        }
    }
}
