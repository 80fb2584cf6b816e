// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the marketplace REST API.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use confab_config::model::RtcConfig;
use confab_core::{ConsultantQuery, Message, SessionStatus, SessionView, User};
use confab_engine::{ConsultantProfile, ProfileUpdate, ReviewView, SessionRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

/// Default and maximum page size for session listings.
const DEFAULT_SESSION_LIMIT: i64 = 100;

// --- Sessions ---

#[derive(Debug, Deserialize)]
pub struct SessionListParams {
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Body for PATCH /v1/sessions/{id}/status.
///
/// The target arrives as a string and is parsed against the closed enum
/// so an unknown value is an invalid request, not a silent no-op.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// POST /v1/sessions
pub async fn request_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .request_session(&user.0, body)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// GET /v1/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SessionListParams>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SESSION_LIMIT)
        .clamp(1, DEFAULT_SESSION_LIMIT);
    let views = state
        .sessions
        .list_sessions(&user.0, params.status, limit)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(views))
}

/// GET /v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .get_session(&session_id, &user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// POST /v1/sessions/{id}/accept
pub async fn accept_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .accept_session(&session_id, &user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// POST /v1/sessions/{id}/reject
pub async fn reject_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .reject_session(&session_id, &user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// POST /v1/sessions/{id}/start-video
pub async fn start_video(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .sessions
        .start_video(&session_id, &user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// PATCH /v1/sessions/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let target: SessionStatus = body.status.parse().map_err(|_| {
        state.fail(confab_core::ConfabError::InvalidRequest(format!(
            "unknown status {:?}",
            body.status
        )))
    })?;
    let view = state
        .sessions
        .update_status(&session_id, &user.0, target)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(view))
}

/// GET /v1/sessions/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .sessions
        .list_messages(&session_id, &user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(messages))
}

// --- Users ---

#[derive(Debug, Deserialize)]
pub struct TopupRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct ConsultantListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// PUT /v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let updated = state
        .accounts
        .update_profile(&user.0, body)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(updated))
}

/// POST /v1/users/topup
pub async fn topup_credits(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<TopupRequest>,
) -> Result<Json<User>, ApiError> {
    let updated = state
        .accounts
        .topup_credits(&user.0, body.amount)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(updated))
}

/// GET /v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let account = state
        .accounts
        .get_account(&user.0)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(account))
}

/// GET /v1/users/consultants (public)
pub async fn list_consultants(
    State(state): State<AppState>,
    Query(params): Query<ConsultantListParams>,
) -> Result<Json<Vec<ConsultantProfile>>, ApiError> {
    let query = ConsultantQuery {
        search: params.search,
        category: params.category,
        skip: params.skip.unwrap_or(0).max(0),
        limit: params.limit.unwrap_or(10).clamp(1, 100),
    };
    let consultants = state
        .accounts
        .list_consultants(&query)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(consultants))
}

/// GET /v1/users/{id} (public profile)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ConsultantProfile>, ApiError> {
    let profile = state
        .accounts
        .get_profile(&user_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(profile))
}

// --- Reviews ---

#[derive(Debug, Deserialize)]
pub struct ReviewCreateRequest {
    pub session_id: String,
    pub rating: i64,
    pub comment: String,
}

/// POST /v1/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReviewCreateRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let review = state
        .reviews
        .create_review(&user.0, &body.session_id, body.rating, body.comment)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(review))
}

/// GET /v1/reviews/consultant/{id} (public)
pub async fn list_consultant_reviews(
    State(state): State<AppState>,
    Path(consultant_id): Path<String>,
) -> Result<Json<Vec<ReviewView>>, ApiError> {
    let reviews = state
        .reviews
        .list_for_consultant(&consultant_id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(reviews))
}

// --- Health & RTC config ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health (public)
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Assemble the ICE server list clients use for peer negotiation.
///
/// STUN entries come straight from config; a configured `turn:` URL also
/// yields its `turns:` (TLS) variant with the same credentials.
pub fn build_ice_servers(rtc: &RtcConfig) -> Vec<serde_json::Value> {
    let mut servers: Vec<serde_json::Value> = rtc
        .stun_servers
        .iter()
        .map(|url| serde_json::json!({ "urls": url }))
        .collect();

    if let Some(ref turn_url) = rtc.turn_url {
        let mut turn = serde_json::json!({ "urls": turn_url });
        if let Some(ref username) = rtc.turn_username {
            turn["username"] = serde_json::json!(username);
        }
        if let Some(ref credential) = rtc.turn_credential {
            turn["credential"] = serde_json::json!(credential);
        }
        servers.push(turn.clone());

        if let Some(stripped) = turn_url.strip_prefix("turn:") {
            let mut turns = turn;
            turns["urls"] = serde_json::json!(format!("turns:{stripped}"));
            servers.push(turns);
        }
    }

    servers
}

/// GET /v1/config/rtc (public)
pub async fn get_rtc_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "iceServers": build_ice_servers(&state.rtc),
        "iceCandidatePoolSize": 10,
    }))
}
