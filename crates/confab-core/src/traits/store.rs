// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable record store trait for marketplace entities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ConfabError;
use crate::types::{
    Availability, ConsultantQuery, Message, Review, Session, SessionCompletion, SessionStatus,
    User,
};

/// Durable storage of users, sessions, messages, and reviews.
///
/// Concurrent status transitions are safe because every transition method
/// is a conditional update: it succeeds only when the session's current
/// status is one of the expected pre-states, and reports whether it
/// applied. [`apply_completion`](MarketStore::apply_completion) extends
/// that guard over the whole billing write set in one transaction, so
/// completion billing executes at most once per session.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // --- Users ---

    async fn create_user(&self, user: &User) -> Result<(), ConfabError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, ConfabError>;

    /// Persist profile fields. Does not touch `credits`; role changes are
    /// rejected upstream.
    async fn update_user(&self, user: &User) -> Result<(), ConfabError>;

    /// Apply a signed delta to a user's credit balance.
    async fn adjust_credits(&self, user_id: &str, delta: f64) -> Result<(), ConfabError>;

    async fn set_availability(
        &self,
        user_id: &str,
        status: Availability,
    ) -> Result<(), ConfabError>;

    /// Set the user back to online, but only if currently busy.
    async fn reset_busy(&self, user_id: &str) -> Result<(), ConfabError>;

    /// Consultant directory with store-level filtering and pagination.
    async fn list_consultants(&self, query: &ConsultantQuery) -> Result<Vec<User>, ConfabError>;

    // --- Sessions ---

    async fn create_session(&self, session: &Session) -> Result<(), ConfabError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, ConfabError>;

    /// Sessions where the user is client OR consultant, newest first.
    ///
    /// Must be an indexed store-level query, never load-all-and-filter.
    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        status: Option<SessionStatus>,
        limit: i64,
    ) -> Result<Vec<Session>, ConfabError>;

    /// Compare-and-swap on the status column. Returns whether a row moved
    /// from one of `from` to `to`; `false` means a concurrent transition
    /// won or the session does not exist.
    async fn transition_status(
        &self,
        id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
    ) -> Result<bool, ConfabError>;

    /// Move an accepted/active session to active, recording
    /// `actual_start_time` on first entry only. Idempotent for an already
    /// active session.
    async fn mark_video_started(
        &self,
        id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<bool, ConfabError>;

    /// Atomically complete a session: status + end time + cost fields,
    /// client debit, consultant credit, and the consultant's busy ->
    /// online reset, guarded by a non-terminal-status condition. Returns
    /// whether the completion applied; `false` means the session was
    /// already terminal and nothing was written.
    async fn apply_completion(&self, completion: &SessionCompletion)
        -> Result<bool, ConfabError>;

    // --- Messages ---

    async fn insert_message(&self, message: &Message) -> Result<(), ConfabError>;

    /// Chronological chat history for a session.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, ConfabError>;

    // --- Reviews ---

    async fn create_review(&self, review: &Review) -> Result<(), ConfabError>;

    async fn find_review_for_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Review>, ConfabError>;

    async fn list_reviews_for_consultant(
        &self,
        consultant_id: &str,
    ) -> Result<Vec<Review>, ConfabError>;
}
