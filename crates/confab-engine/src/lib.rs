// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business logic for the Confab marketplace.
//!
//! Three services over the [`MarketStore`] seam:
//! - [`SessionEngine`]: the session lifecycle state machine, per-transition
//!   authorization, and completion billing
//! - [`AccountService`]: profile updates, credit top-ups, and the public
//!   consultant directory
//! - [`ReviewService`]: review creation under the one-per-completed-session
//!   invariants
//!
//! None of these hold state of their own; all consistency comes from the
//! store's conditional updates.

pub mod accounts;
pub mod lifecycle;
pub mod reviews;

pub use accounts::{AccountService, ConsultantProfile, ProfileUpdate};
pub use lifecycle::{SessionEngine, SessionRequest};
pub use reviews::{ReviewService, ReviewView};

use std::sync::Arc;

use confab_core::{ConfabError, MarketStore, Session, User};

/// Load a user or fail with the taxonomy's NotFound.
pub(crate) async fn fetch_user(
    store: &Arc<dyn MarketStore>,
    id: &str,
) -> Result<User, ConfabError> {
    store
        .get_user(id)
        .await?
        .ok_or_else(|| ConfabError::NotFound(format!("user {id}")))
}

/// Load a session or fail with the taxonomy's NotFound.
pub(crate) async fn fetch_session(
    store: &Arc<dyn MarketStore>,
    id: &str,
) -> Result<Session, ConfabError> {
    store
        .get_session(id)
        .await?
        .ok_or_else(|| ConfabError::NotFound(format!("session {id}")))
}
