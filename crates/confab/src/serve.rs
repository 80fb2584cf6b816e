// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `confab serve` command implementation.
//!
//! Wires the SQLite store, lifecycle engine, room registry, and gateway
//! together, then serves until a shutdown signal arrives.

use std::sync::Arc;

use tracing::{info, warn};

use confab_config::ConfabConfig;
use confab_core::{ConfabError, MarketStore, Notifier, TokenVerifier};
use confab_engine::{AccountService, ReviewService, SessionEngine};
use confab_gateway::{start_server, AppState, HmacTokenVerifier};
use confab_relay::RoomRegistry;
use confab_storage::SqliteStore;

use crate::notify::LogNotifier;

/// Initialize the tracing subscriber from config, honoring RUST_LOG.
fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the `confab serve` command.
pub async fn run_serve(config: ConfabConfig) -> Result<(), ConfabError> {
    init_tracing(&config.server.log_level);
    info!("starting confab serve");

    let sqlite = Arc::new(SqliteStore::open(&config.storage).await?);
    let store: Arc<dyn MarketStore> = sqlite.clone();

    if config.auth.token_secret.is_none() {
        warn!("no auth.token_secret configured -- every credentialed request will be rejected");
    }
    let verifier: Arc<dyn TokenVerifier> =
        Arc::new(HmacTokenVerifier::new(config.auth.token_secret.clone()));
    let notifier: Arc<dyn Notifier> =
        Arc::new(LogNotifier::new(config.notifications.enabled));

    // The room registry is owned here and injected; it dies with the
    // process, as presence should.
    let registry = Arc::new(RoomRegistry::new());

    let state = AppState {
        sessions: Arc::new(SessionEngine::new(store.clone(), notifier)),
        accounts: Arc::new(AccountService::new(store.clone())),
        reviews: Arc::new(ReviewService::new(store.clone())),
        store,
        registry,
        verifier,
        rtc: config.rtc.clone(),
        verbose_errors: config.server.verbose_errors,
        start_time: std::time::Instant::now(),
    };

    tokio::select! {
        result = start_server(&config.server, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            sqlite.close().await?;
            Ok(())
        }
    }
}
