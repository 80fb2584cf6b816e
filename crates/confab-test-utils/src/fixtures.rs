// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User and store builders.

use std::sync::Arc;

use chrono::Utc;
use confab_core::{Availability, MarketStore, User, UserRole};
use confab_storage::SqliteStore;

/// A client account with the given starting balance.
pub fn client_user(id: &str, credits: f64) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: "Casey".to_string(),
        last_name: "Client".to_string(),
        role: UserRole::Client,
        credits,
        headline: None,
        bio: None,
        skills: vec![],
        price_per_minute: None,
        rating: 5.0,
        review_count: 0,
        category: "Development".to_string(),
        status: Availability::Offline,
        timezone: "UTC".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// A consultant account with the given per-minute rate.
pub fn consultant_user(id: &str, price_per_minute: Option<f64>) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: "Kim".to_string(),
        last_name: "Consultant".to_string(),
        role: UserRole::Consultant,
        credits: 0.0,
        headline: Some("Systems programming".to_string()),
        bio: None,
        skills: vec!["rust".to_string()],
        price_per_minute,
        rating: 5.0,
        review_count: 0,
        category: "Development".to_string(),
        status: Availability::Online,
        timezone: "UTC".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// An empty in-memory store.
pub async fn fresh_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

/// An in-memory store pre-populated with the given users.
pub async fn seeded_store(users: &[User]) -> Arc<SqliteStore> {
    let store = fresh_store().await;
    for user in users {
        store.create_user(user).await.expect("seed user");
    }
    store
}
