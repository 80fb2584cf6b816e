// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer credential verification and the REST auth middleware.
//!
//! Confab never issues credentials. The external identity service mints
//! tokens of the form `<user_id>.<hex hmac-sha256(user_id)>` over a
//! shared secret; this module only verifies them. With no secret
//! configured, every request is rejected (fail-closed).

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

use confab_core::{ConfabError, TokenVerifier};

use crate::error::ApiError;
use crate::server::AppState;

type HmacSha256 = Hmac<Sha256>;

/// The authenticated user id, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// HMAC-SHA256 verifier over a shared secret.
pub struct HmacTokenVerifier {
    secret: Option<String>,
}

impl HmacTokenVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl TokenVerifier for HmacTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, ConfabError> {
        let Some(ref secret) = self.secret else {
            error!("no token secret configured -- rejecting credential");
            return Err(ConfabError::Unauthenticated(
                "credential verification is not configured".to_string(),
            ));
        };

        let (user_id, tag_hex) = token.rsplit_once('.').ok_or_else(|| {
            ConfabError::Unauthenticated("malformed credential".to_string())
        })?;
        if user_id.is_empty() {
            return Err(ConfabError::Unauthenticated(
                "malformed credential".to_string(),
            ));
        }
        let tag = hex::decode(tag_hex).map_err(|_| {
            ConfabError::Unauthenticated("malformed credential".to_string())
        })?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ConfabError::Unauthenticated("malformed credential".to_string()))?;
        mac.update(user_id.as_bytes());
        // Constant-time comparison via the hmac crate.
        mac.verify_slice(&tag).map_err(|_| {
            ConfabError::Unauthenticated("invalid credential".to_string())
        })?;

        Ok(user_id.to_string())
    }
}

/// Middleware that requires a valid `Authorization: Bearer <token>` header
/// and stashes the authenticated user id for handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(ApiError::from_error(
            ConfabError::Unauthenticated("missing bearer credential".to_string()),
            state.verbose_errors,
        ));
    };

    let user_id = state
        .verifier
        .verify(token)
        .await
        .map_err(|e| ApiError::from_error(e, state.verbose_errors))?;

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
