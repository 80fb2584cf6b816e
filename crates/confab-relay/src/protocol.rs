// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire protocol for the realtime channel.
//!
//! Client -> Server (JSON, discriminated by `"type"`):
//! ```json
//! {"type": "offer", "sdp": "..."}
//! {"type": "answer", "sdp": "..."}
//! {"type": "ice-candidate", "candidate": {...}}
//! {"type": "chat", "text": "hi", "timestamp": 1767225600000}
//! {"type": "end-session"}
//! ```
//! Signaling payloads are opaque: nothing past the `type` tag is
//! validated, and they are relayed byte-for-byte.
//!
//! Server -> Client events are [`ServerEvent`]; signaling frames pass
//! through verbatim and never take this shape.

use serde::Serialize;

/// Client frame type tags.
pub mod frame_types {
    pub const OFFER: &str = "offer";
    pub const ANSWER: &str = "answer";
    pub const ICE_CANDIDATE: &str = "ice-candidate";
    pub const CHAT: &str = "chat";
    pub const END_SESSION: &str = "end-session";
}

/// Server-originated room events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    UserJoined { user_id: String, count: usize },
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: String },
    #[serde(rename_all = "camelCase")]
    Chat {
        user_id: String,
        text: String,
        /// Milliseconds since the Unix epoch.
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    SessionEnded { user_id: String },
}

impl ServerEvent {
    /// Render to the wire form. Infallible for this enum's shape.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server events serialize")
    }
}
