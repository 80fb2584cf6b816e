// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Confab marketplace.
//!
//! REST drives the session lifecycle engine; the WebSocket endpoint
//! feeds the realtime relay. Authentication is bearer-token based and
//! fail-closed; Confab verifies credentials but never issues them.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::{AuthUser, HmacTokenVerifier};
pub use error::ApiError;
pub use server::{router, start_server, AppState};
