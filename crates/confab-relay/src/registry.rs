// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence & connection registry: session id -> connected participants.
//!
//! Owned by the process and injected into the relay; never a global.
//! DashMap's per-shard locking keeps rooms independent: a broadcast in
//! room A never blocks a connect in room B. Broadcast snapshots the
//! occupant senders and sends after releasing the shard guard, so no
//! await happens while a lock is held.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Outbound frame queue for one connection.
pub type OutboundSender = mpsc::Sender<String>;

/// In-memory table of live realtime connections, keyed by session id.
///
/// Not a source of truth for session participation, only for "is
/// currently connected"; entries die with the process.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashMap<String, OutboundSender>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under its session's room. Returns the
    /// occupant count after joining.
    pub fn join(&self, session_id: &str, user_id: &str, sender: OutboundSender) -> usize {
        let mut room = self.rooms.entry(session_id.to_string()).or_default();
        room.insert(user_id.to_string(), sender);
        debug!(session_id, user_id, occupants = room.len(), "joined room");
        room.len()
    }

    /// Remove a connection; the room entry itself is dropped once empty.
    pub fn leave(&self, session_id: &str, user_id: &str) {
        if let Some(mut room) = self.rooms.get_mut(session_id) {
            room.remove(user_id);
            let empty = room.is_empty();
            drop(room);
            if empty {
                self.rooms.remove_if(session_id, |_, room| room.is_empty());
            }
        }
        debug!(session_id, user_id, "left room");
    }

    /// Current occupant count for a room.
    pub fn occupants(&self, session_id: &str) -> usize {
        self.rooms.get(session_id).map(|room| room.len()).unwrap_or(0)
    }

    /// Deliver a payload to every room occupant except `exclude`.
    ///
    /// Best-effort fan-out: a dead peer's send failure is logged and
    /// never prevents delivery to the rest.
    pub async fn broadcast(&self, session_id: &str, payload: &str, exclude: Option<&str>) {
        let targets: Vec<(String, OutboundSender)> = match self.rooms.get(session_id) {
            Some(room) => room
                .iter()
                .filter(|(user_id, _)| exclude != Some(user_id.as_str()))
                .map(|(user_id, sender)| (user_id.clone(), sender.clone()))
                .collect(),
            None => return,
        };

        for (user_id, sender) in targets {
            if sender.send(payload.to_string()).await.is_err() {
                warn!(session_id, user_id, "failed to deliver to room occupant");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (OutboundSender, mpsc::Receiver<String>) {
        mpsc::channel(16)
    }

    #[tokio::test]
    async fn join_counts_and_leave_drops_empty_rooms() {
        let registry = RoomRegistry::new();
        let (tx_a, _rx_a) = channel();
        let (tx_b, _rx_b) = channel();

        assert_eq!(registry.join("s1", "a", tx_a), 1);
        assert_eq!(registry.join("s1", "b", tx_b), 2);
        assert_eq!(registry.occupants("s1"), 2);

        registry.leave("s1", "a");
        assert_eq!(registry.occupants("s1"), 1);
        registry.leave("s1", "b");
        assert_eq!(registry.occupants("s1"), 0);
        assert!(registry.rooms.get("s1").is_none(), "empty room removed");
    }

    #[tokio::test]
    async fn broadcast_excludes_sender_and_other_rooms() {
        let registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        let (tx_c, mut rx_c) = channel();
        registry.join("s1", "a", tx_a);
        registry.join("s1", "b", tx_b);
        registry.join("s2", "c", tx_c);

        registry.broadcast("s1", "hello", Some("a")).await;

        assert_eq!(rx_b.try_recv().unwrap(), "hello");
        assert!(rx_a.try_recv().is_err(), "no self-echo");
        assert!(rx_c.try_recv().is_err(), "rooms are isolated");
    }

    #[tokio::test]
    async fn broadcast_survives_a_dead_peer() {
        let registry = RoomRegistry::new();
        let (tx_dead, rx_dead) = channel();
        let (tx_live, mut rx_live) = channel();
        registry.join("s1", "dead", tx_dead);
        registry.join("s1", "live", tx_live);
        drop(rx_dead); // peer died without a clean close

        registry.broadcast("s1", "still here", None).await;
        assert_eq!(rx_live.try_recv().unwrap(), "still here");
    }

    #[tokio::test]
    async fn broadcast_to_unknown_room_is_a_noop() {
        let registry = RoomRegistry::new();
        registry.broadcast("nowhere", "x", None).await;
    }
}
