// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account operations: owner-only profile updates, credit top-ups, and
//! the public consultant directory.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use confab_core::{
    Availability, ConfabError, ConsultantQuery, MarketStore, User, UserRole,
};

use crate::fetch_user;

/// Partial profile update. `None` leaves the field untouched.
///
/// Role and credits are not represented here at all: a profile update
/// cannot reach them by construction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub price_per_minute: Option<f64>,
    pub category: Option<String>,
    pub timezone: Option<String>,
    pub status: Option<Availability>,
}

/// Public view of a consultant: everything a browsing client may see,
/// and nothing from the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultantProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub price_per_minute: Option<f64>,
    pub rating: f64,
    pub review_count: i64,
    pub category: String,
    pub status: Availability,
    pub timezone: String,
}

impl From<&User> for ConsultantProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            headline: user.headline.clone(),
            bio: user.bio.clone(),
            skills: user.skills.clone(),
            price_per_minute: user.price_per_minute,
            rating: user.rating,
            review_count: user.review_count,
            category: user.category.clone(),
            status: user.status,
            timezone: user.timezone.clone(),
        }
    }
}

/// Profile and ledger operations.
pub struct AccountService {
    store: Arc<dyn MarketStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Apply an owner-only partial update and return the updated account.
    pub async fn update_profile(
        &self,
        acting_user_id: &str,
        update: ProfileUpdate,
    ) -> Result<User, ConfabError> {
        if let Some(rate) = update.price_per_minute {
            if rate < 0.0 {
                return Err(ConfabError::InvalidRequest(
                    "price_per_minute must be non-negative".to_string(),
                ));
            }
        }

        let mut user = fetch_user(&self.store, acting_user_id).await?;
        if let Some(v) = update.first_name {
            user.first_name = v;
        }
        if let Some(v) = update.last_name {
            user.last_name = v;
        }
        if let Some(v) = update.headline {
            user.headline = Some(v);
        }
        if let Some(v) = update.bio {
            user.bio = Some(v);
        }
        if let Some(v) = update.skills {
            user.skills = v;
        }
        if let Some(v) = update.price_per_minute {
            user.price_per_minute = Some(v);
        }
        if let Some(v) = update.category {
            user.category = v;
        }
        if let Some(v) = update.timezone {
            user.timezone = v;
        }
        if let Some(v) = update.status {
            user.status = v;
        }
        user.updated_at = Utc::now();

        self.store.update_user(&user).await?;
        fetch_user(&self.store, acting_user_id).await
    }

    /// Add credits to the acting user's ledger.
    pub async fn topup_credits(
        &self,
        acting_user_id: &str,
        amount: f64,
    ) -> Result<User, ConfabError> {
        if amount <= 0.0 {
            return Err(ConfabError::InvalidRequest(
                "amount must be positive".to_string(),
            ));
        }
        self.store.adjust_credits(acting_user_id, amount).await?;
        info!(user_id = acting_user_id, amount, "credits topped up");
        fetch_user(&self.store, acting_user_id).await
    }

    /// Public consultant directory.
    pub async fn list_consultants(
        &self,
        query: &ConsultantQuery,
    ) -> Result<Vec<ConsultantProfile>, ConfabError> {
        let consultants = self.store.list_consultants(query).await?;
        Ok(consultants.iter().map(ConsultantProfile::from).collect())
    }

    /// Public profile lookup by id.
    pub async fn get_profile(&self, user_id: &str) -> Result<ConsultantProfile, ConfabError> {
        let user = fetch_user(&self.store, user_id).await?;
        Ok(ConsultantProfile::from(&user))
    }

    /// The acting user's own account, ledger included.
    pub async fn get_account(&self, acting_user_id: &str) -> Result<User, ConfabError> {
        fetch_user(&self.store, acting_user_id).await
    }
}
