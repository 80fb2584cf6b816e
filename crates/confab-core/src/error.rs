// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Confab marketplace.

use thiserror::Error;

/// The primary error type used across all Confab crates.
///
/// The first six variants form the user-visible taxonomy; the API layer
/// maps each to a distinct transport status. The remaining variants are
/// infrastructure failures and surface as internal errors.
#[derive(Debug, Error)]
pub enum ConfabError {
    /// Referenced entity (session, user, review target) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Authenticated, but not authorized for this action on this entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Action is not valid given the entity's current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed input (self-booking, role mismatch, illegal transition target).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Insufficient credit balance to start a paid session.
    #[error("payment required: {0}")]
    PaymentRequired(String),

    /// Missing or invalid bearer credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport/channel errors (bind failure, socket errors).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConfabError {
    /// Stable machine-readable code for the wire error body.
    pub fn code(&self) -> &'static str {
        match self {
            ConfabError::NotFound(_) => "not_found",
            ConfabError::Forbidden(_) => "forbidden",
            ConfabError::InvalidState(_) => "invalid_state",
            ConfabError::InvalidRequest(_) => "invalid_request",
            ConfabError::PaymentRequired(_) => "payment_required",
            ConfabError::Unauthenticated(_) => "unauthenticated",
            ConfabError::Config(_) => "config",
            ConfabError::Storage { .. } => "storage",
            ConfabError::Channel { .. } => "channel",
            ConfabError::Internal(_) => "internal",
        }
    }

    /// True for the taxonomy variants whose message is safe to show callers
    /// regardless of posture. Infrastructure variants may leak internals.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ConfabError::NotFound(_)
                | ConfabError::Forbidden(_)
                | ConfabError::InvalidState(_)
                | ConfabError::InvalidRequest(_)
                | ConfabError::PaymentRequired(_)
                | ConfabError::Unauthenticated(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_codes_are_distinct() {
        let errors = [
            ConfabError::NotFound("session".into()),
            ConfabError::Forbidden("x".into()),
            ConfabError::InvalidState("x".into()),
            ConfabError::InvalidRequest("x".into()),
            ConfabError::PaymentRequired("x".into()),
            ConfabError::Unauthenticated("x".into()),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(errors.iter().all(|e| e.is_user_visible()));
    }

    #[test]
    fn infrastructure_errors_are_not_user_visible() {
        let storage = ConfabError::Storage {
            source: Box::new(std::io::Error::other("disk on fire")),
        };
        assert!(!storage.is_user_visible());
        assert!(!ConfabError::Internal("x".into()).is_user_visible());
    }

    #[test]
    fn display_carries_detail() {
        let err = ConfabError::PaymentRequired("rate is $2/min".into());
        assert_eq!(err.to_string(), "payment required: rate is $2/min");
    }
}
