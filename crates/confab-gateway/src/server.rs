// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use confab_config::model::{RtcConfig, ServerConfig};
use confab_core::{ConfabError, MarketStore, TokenVerifier};
use confab_engine::{AccountService, ReviewService, SessionEngine};
use confab_relay::RoomRegistry;

use crate::auth::auth_middleware;
use crate::error::ApiError;
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionEngine>,
    pub accounts: Arc<AccountService>,
    pub reviews: Arc<ReviewService>,
    /// Read directly by the relay for authorization and chat persistence.
    pub store: Arc<dyn MarketStore>,
    /// Process-owned room table, injected at startup.
    pub registry: Arc<RoomRegistry>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub rtc: RtcConfig,
    pub verbose_errors: bool,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Render a core error for the wire under the configured posture.
    pub fn fail(&self, err: ConfabError) -> ApiError {
        ApiError::from_error(err, self.verbose_errors)
    }
}

/// Build the full gateway router.
///
/// Three route groups:
/// - public: health, RTC config, consultant directory, reviews read
/// - authenticated: sessions, profile, ledger, reviews write
/// - websocket: credential checked during the connection gate, not by
///   middleware
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/config/rtc", get(handlers::get_rtc_config))
        .route("/v1/users/consultants", get(handlers::list_consultants))
        .route("/v1/users/{id}", get(handlers::get_user))
        .route(
            "/v1/reviews/consultant/{id}",
            get(handlers::list_consultant_reviews),
        )
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/sessions", post(handlers::request_session))
        .route("/v1/sessions", get(handlers::list_sessions))
        .route("/v1/sessions/{id}", get(handlers::get_session))
        .route("/v1/sessions/{id}/accept", post(handlers::accept_session))
        .route("/v1/sessions/{id}/reject", post(handlers::reject_session))
        .route("/v1/sessions/{id}/start-video", post(handlers::start_video))
        .route("/v1/sessions/{id}/status", patch(handlers::update_status))
        .route("/v1/sessions/{id}/messages", get(handlers::list_messages))
        .route("/v1/users/profile", put(handlers::update_profile))
        .route("/v1/users/topup", post(handlers::topup_credits))
        .route("/v1/users/me", get(handlers::get_me))
        .route("/v1/reviews", post(handlers::create_review))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws/session/{session_id}/{user_id}", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server. Runs until the process exits.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ConfabError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConfabError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ConfabError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
