// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures and mock collaborators for Confab test suites.
//!
//! Provides user/session builders over an in-memory store, a recording
//! notifier, and a token minter compatible with the gateway's HMAC
//! verifier (standing in for the external identity issuer).

pub mod fixtures;
pub mod notifier;
pub mod tokens;

pub use fixtures::{client_user, consultant_user, fresh_store, seeded_store};
pub use notifier::RecordingNotifier;
pub use tokens::mint_token;
