// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from the core error taxonomy to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use confab_core::ConfabError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code (`not_found`, `invalid_state`, ...).
    pub code: String,
    /// Human-readable description.
    pub error: String,
}

/// A core error rendered for the wire.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Map a core error to its transport status.
    ///
    /// Taxonomy errors keep their message in any posture; infrastructure
    /// errors expose detail only when `verbose` (development posture) is
    /// set, and are logged either way.
    pub fn from_error(err: ConfabError, verbose: bool) -> Self {
        let status = match &err {
            ConfabError::NotFound(_) => StatusCode::NOT_FOUND,
            ConfabError::Forbidden(_) => StatusCode::FORBIDDEN,
            ConfabError::InvalidState(_) => StatusCode::CONFLICT,
            ConfabError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ConfabError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ConfabError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if err.is_user_visible() || verbose {
            err.to_string()
        } else {
            "internal server error".to_string()
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "request failed");
        }

        Self {
            status,
            body: ErrorBody {
                code: err.code().to_string(),
                error: message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
