// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review creation under the one-per-completed-session invariants.
//!
//! Rating aggregation (the consultant's running average) belongs to an
//! external collaborator that reads completed-session records; this
//! service only creates and lists the records themselves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use confab_core::{ConfabError, MarketStore, Review, SessionStatus};

use crate::{fetch_session, fetch_user};

/// A review with the reviewer's display name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: String,
    pub rating: i64,
    pub comment: String,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
}

/// Review creation and listing.
pub struct ReviewService {
    store: Arc<dyn MarketStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Create the one review a session's client may leave, once the
    /// session is completed.
    pub async fn create_review(
        &self,
        acting_user_id: &str,
        session_id: &str,
        rating: i64,
        comment: String,
    ) -> Result<ReviewView, ConfabError> {
        if !(1..=5).contains(&rating) {
            return Err(ConfabError::InvalidRequest(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        let session = fetch_session(&self.store, session_id).await?;
        if session.client_id != acting_user_id {
            return Err(ConfabError::Forbidden(
                "only the client can leave a review".to_string(),
            ));
        }
        if session.status != SessionStatus::Completed {
            return Err(ConfabError::InvalidState(
                "can only review completed sessions".to_string(),
            ));
        }
        if self
            .store
            .find_review_for_session(session_id)
            .await?
            .is_some()
        {
            return Err(ConfabError::InvalidRequest(
                "this session has already been reviewed".to_string(),
            ));
        }

        let client = fetch_user(&self.store, acting_user_id).await?;
        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            client_id: session.client_id.clone(),
            consultant_id: session.consultant_id.clone(),
            rating,
            comment,
            created_at: Utc::now(),
        };
        self.store.create_review(&review).await?;
        info!(
            session_id = %session.id,
            consultant_id = %session.consultant_id,
            rating,
            "review created"
        );

        Ok(ReviewView {
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            client_name: client.full_name(),
            created_at: review.created_at,
        })
    }

    /// All reviews for a consultant, newest first, reviewer names resolved.
    pub async fn list_for_consultant(
        &self,
        consultant_id: &str,
    ) -> Result<Vec<ReviewView>, ConfabError> {
        let reviews = self.store.list_reviews_for_consultant(consultant_id).await?;
        let mut views = Vec::with_capacity(reviews.len());
        for review in reviews {
            let client_name = match self.store.get_user(&review.client_id).await? {
                Some(client) => client.full_name(),
                None => "Anonymous".to_string(),
            };
            views.push(ReviewView {
                id: review.id,
                rating: review.rating,
                comment: review.comment,
                client_name,
                created_at: review.created_at,
            });
        }
        Ok(views)
    }
}
