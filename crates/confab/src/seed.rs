// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `confab seed` command implementation.
//!
//! Populates the database with demo accounts for local development and
//! prints their bearer tokens when a token secret is configured. The
//! minted tokens match what the external identity service would issue.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use confab_config::ConfabConfig;
use confab_core::{Availability, ConfabError, MarketStore, User, UserRole};
use confab_storage::SqliteStore;

type HmacSha256 = Hmac<Sha256>;

fn mint_token(secret: &str, user_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(user_id.as_bytes());
    format!("{user_id}.{}", hex::encode(mac.finalize().into_bytes()))
}

fn demo_user(
    id: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: UserRole,
) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        role,
        credits: 0.0,
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

/// The demo roster: one funded client, three consultants.
pub(crate) fn demo_users() -> Vec<User> {
    let mut client = demo_user(
        "demo-client",
        "test_client@example.com",
        "Test",
        "Client",
        UserRole::Client,
    );
    client.credits = 50.0;

    let mut sarah = demo_user(
        "demo-sarah",
        "sarah@example.com",
        "Sarah",
        "Jenkins",
        UserRole::Consultant,
    );
    sarah.headline = Some("Senior React Engineer".to_string());
    sarah.bio = Some(
        "Ex-Meta frontend engineer specializing in performance optimization and design systems."
            .to_string(),
    );
    sarah.skills = vec![
        "React".to_string(),
        "TypeScript".to_string(),
        "System Design".to_string(),
    ];
    sarah.price_per_minute = Some(2.0);
    sarah.rating = 4.9;
    sarah.review_count = 42;
    sarah.status = Availability::Online;

    let mut david = demo_user(
        "demo-david",
        "david@example.com",
        "David",
        "Chen",
        UserRole::Consultant,
    );
    david.headline = Some("Full Stack Python Developer".to_string());
    david.skills = vec!["Python".to_string(), "FastAPI".to_string()];
    david.price_per_minute = Some(2.5);
    david.review_count = 18;
    david.status = Availability::Online;

    let mut elena = demo_user(
        "demo-elena",
        "elena@example.com",
        "Elena",
        "Rodriguez",
        UserRole::Consultant,
    );
    elena.headline = Some("Product Design Lead".to_string());
    elena.skills = vec!["Figma".to_string(), "UX Research".to_string()];
    elena.price_per_minute = Some(1.5);
    elena.rating = 4.8;
    elena.review_count = 27;
    elena.category = "Design".to_string();
    elena.status = Availability::Online;

    vec![client, sarah, david, elena]
}

/// Runs the `confab seed` command.
pub async fn run_seed(config: ConfabConfig) -> Result<(), ConfabError> {
    let store = SqliteStore::open(&config.storage).await?;

    for user in demo_users() {
        match store.create_user(&user).await {
            Ok(()) => {
                println!("created {} ({}, {})", user.id, user.email, user.role);
                if let Some(ref secret) = config.auth.token_secret {
                    println!("  token: {}", mint_token(secret, &user.id));
                }
            }
            Err(_) => println!("skipped {} (already exists)", user.id),
        }
    }

    store.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_config::model::StorageConfig;
    use tempfile::tempdir;

    #[test]
    fn demo_roster_has_one_funded_client() {
        let users = demo_users();
        let clients: Vec<_> = users
            .iter()
            .filter(|u| u.role == UserRole::Client)
            .collect();
        assert_eq!(clients.len(), 1);
        assert!(clients[0].credits >= 50.0);
        assert!(users
            .iter()
            .filter(|u| u.role == UserRole::Consultant)
            .all(|u| u.price_per_minute.is_some()));
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed.db");
        let storage = StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        };
        let mut config = ConfabConfig::default();
        config.storage = storage.clone();

        run_seed(config.clone()).await.unwrap();
        run_seed(config).await.unwrap();

        let store = SqliteStore::open(&storage).await.unwrap();
        let client = store.get_user("demo-client").await.unwrap().unwrap();
        assert_eq!(client.email, "test_client@example.com");
        store.close().await.unwrap();
    }
}
