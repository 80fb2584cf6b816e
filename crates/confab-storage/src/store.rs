// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MarketStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use confab_config::model::StorageConfig;
use confab_core::{
    Availability, ConfabError, ConsultantQuery, MarketStore, Message, Review, Session,
    SessionCompletion, SessionStatus, User,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed marketplace store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. All writes are serialized through the single
/// tokio-rusqlite background thread, which is what lets the conditional
/// transition updates act as compare-and-swap.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store at the configured path, applying migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, ConfabError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store opened");
        Ok(Self { db })
    }

    /// Open an in-memory store with the full schema. Test use.
    pub async fn open_in_memory() -> Result<Self, ConfabError> {
        let db = Database::open_in_memory().await?;
        Ok(Self { db })
    }

    /// Checkpoint and release before shutdown.
    pub async fn close(&self) -> Result<(), ConfabError> {
        self.db.close().await
    }
}

#[async_trait]
impl MarketStore for SqliteStore {
    async fn create_user(&self, user: &User) -> Result<(), ConfabError> {
        queries::users::create_user(&self.db, user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, ConfabError> {
        queries::users::get_user(&self.db, id).await
    }

    async fn update_user(&self, user: &User) -> Result<(), ConfabError> {
        queries::users::update_profile(&self.db, user).await
    }

    async fn adjust_credits(&self, user_id: &str, delta: f64) -> Result<(), ConfabError> {
        let found = queries::users::adjust_credits(&self.db, user_id, delta).await?;
        if !found {
            return Err(ConfabError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn set_availability(
        &self,
        user_id: &str,
        status: Availability,
    ) -> Result<(), ConfabError> {
        queries::users::set_availability(&self.db, user_id, status).await
    }

    async fn reset_busy(&self, user_id: &str) -> Result<(), ConfabError> {
        queries::users::reset_busy(&self.db, user_id).await
    }

    async fn list_consultants(&self, query: &ConsultantQuery) -> Result<Vec<User>, ConfabError> {
        queries::users::list_consultants(&self.db, query).await
    }

    async fn create_session(&self, session: &Session) -> Result<(), ConfabError> {
        queries::sessions::create_session(&self.db, session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, ConfabError> {
        queries::sessions::get_session(&self.db, id).await
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        status: Option<SessionStatus>,
        limit: i64,
    ) -> Result<Vec<Session>, ConfabError> {
        queries::sessions::list_for_user(&self.db, user_id, status, limit).await
    }

    async fn transition_status(
        &self,
        id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
    ) -> Result<bool, ConfabError> {
        queries::sessions::transition_status(&self.db, id, from, to).await
    }

    async fn mark_video_started(
        &self,
        id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<bool, ConfabError> {
        queries::sessions::mark_video_started(&self.db, id, started_at).await
    }

    async fn apply_completion(
        &self,
        completion: &SessionCompletion,
    ) -> Result<bool, ConfabError> {
        queries::sessions::apply_completion(&self.db, completion).await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ConfabError> {
        queries::messages::insert_message(&self.db, message).await
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, ConfabError> {
        queries::messages::list_for_session(&self.db, session_id).await
    }

    async fn create_review(&self, review: &Review) -> Result<(), ConfabError> {
        queries::reviews::create_review(&self.db, review).await
    }

    async fn find_review_for_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Review>, ConfabError> {
        queries::reviews::find_for_session(&self.db, session_id).await
    }

    async fn list_reviews_for_consultant(
        &self,
        consultant_id: &str,
    ) -> Result<Vec<Review>, ConfabError> {
        queries::reviews::list_for_consultant(&self.db, consultant_id).await
    }
}
