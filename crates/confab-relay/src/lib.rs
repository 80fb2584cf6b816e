// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence registry and realtime relay for Confab sessions.
//!
//! Multiplexes per-session realtime channels: WebRTC signaling passes
//! through opaquely, chat is persisted best-effort and fanned out, and
//! room membership events announce joins and departures. The relay reads
//! session data for authorization but never drives lifecycle transitions
//! itself.

pub mod protocol;
pub mod registry;
pub mod relay;

pub use protocol::ServerEvent;
pub use registry::{OutboundSender, RoomRegistry};
pub use relay::RelayConnection;
