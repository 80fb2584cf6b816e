// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities and closed enums shared across the Confab workspace.
//!
//! Status and role fields are closed tagged variants (never free strings):
//! the string form stored in SQLite and sent on the wire round-trips
//! through strum's `Display`/`EnumString` derives, and every transition
//! site matches exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role assigned at account creation. Never self-escalatable: profile
/// updates cannot touch this field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Consultant,
    Admin,
}

/// Consultant availability. Stored on every user; only meaningful for
/// consultants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Online,
    Offline,
    Busy,
}

/// Session lifecycle states.
///
/// `Pending` is the sole initial state. `Rejected`, `Completed`, and
/// `Cancelled` are terminal: no transition ever leaves them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Accepted,
    Rejected,
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// States that admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Rejected | SessionStatus::Completed | SessionStatus::Cancelled
        )
    }

    /// All states a session can still be moved out of.
    pub const NON_TERMINAL: [SessionStatus; 3] = [
        SessionStatus::Pending,
        SessionStatus::Accepted,
        SessionStatus::Active,
    ];
}

/// A marketplace account with its credit ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Unique email, owned by the external identity collaborator.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    /// Internal ledger value. May go transiently negative under concurrent
    /// billing; completion billing applies at most once per session.
    pub credits: f64,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    /// Consultant rate. `None` means not for hire.
    pub price_per_minute: Option<f64>,
    /// Running average, 1.0..=5.0. Written by the external review
    /// aggregation collaborator.
    pub rating: f64,
    pub review_count: i64,
    pub category: String,
    pub status: Availability,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One booked consultation between a client and a consultant.
///
/// Participants are stored as plain ids; anything needing display data
/// goes through [`SessionView`]. Sessions are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub client_id: String,
    pub consultant_id: String,
    pub topic: String,
    pub description: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    /// Immediate if `None`.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Client's initial estimate, informational only.
    pub duration_minutes: i64,
    /// Set once, by the first successful video start.
    pub actual_start_time: Option<DateTime<Utc>>,
    /// Set once, by the completion transition.
    pub actual_end_time: Option<DateTime<Utc>>,
    pub actual_duration_seconds: i64,
    /// Rate snapshot captured at creation; immutable for the session's
    /// lifetime, so later rate changes never retroactively reprice it.
    pub cost_per_minute: f64,
    /// Computed exactly once, at the completed transition.
    pub total_cost: f64,
    pub is_paid: bool,
}

/// A chat line within a session. Immutable once created; created only as
/// a side effect of a relayed chat frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub sender_id: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// One review per completed session, written by the session's client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub session_id: String,
    pub client_id: String,
    pub consultant_id: String,
    /// 1..=5 inclusive.
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Participant display data resolved for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub headline: Option<String>,
    pub price_per_minute: Option<f64>,
    pub rating: f64,
    pub review_count: i64,
    pub status: Availability,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            headline: user.headline.clone(),
            price_per_minute: user.price_per_minute,
            rating: user.rating,
            review_count: user.review_count,
            status: user.status,
        }
    }
}

/// A session with both participants resolved.
///
/// The explicit hydration step keeps the stored entity (ids only) and the
/// display view (full summaries) from ever blurring into one field.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub client: UserSummary,
    pub consultant: UserSummary,
}

impl SessionView {
    pub fn hydrate(session: Session, client: &User, consultant: &User) -> Self {
        Self {
            session,
            client: UserSummary::from(client),
            consultant: UserSummary::from(consultant),
        }
    }
}

/// Filter for the public consultant directory.
#[derive(Debug, Clone, Default)]
pub struct ConsultantQuery {
    /// Case-insensitive match against name, headline, or skills.
    pub search: Option<String>,
    /// Exact category match; `None` or "All" matches everything.
    pub category: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// Everything the store needs to apply a completion atomically: the
/// session row update, the client debit, the consultant credit, and the
/// consultant's busy -> online reset happen in one transaction.
#[derive(Debug, Clone)]
pub struct SessionCompletion {
    pub session_id: String,
    pub client_id: String,
    pub consultant_id: String,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub cost: f64,
}

/// Lifecycle events handed to the notification collaborator.
///
/// Delivery mechanics (email, push) are out of scope; emission failures
/// are logged at the call site and never propagated.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NotificationEvent {
    SessionRequested {
        session_id: String,
        consultant_id: String,
        client_name: String,
        topic: String,
    },
    SessionAccepted {
        session_id: String,
        client_id: String,
        consultant_name: String,
        topic: String,
    },
    SessionRejected {
        session_id: String,
        client_id: String,
        consultant_name: String,
        topic: String,
    },
    SessionCompleted {
        session_id: String,
        client_id: String,
        consultant_id: String,
        topic: String,
        duration_minutes: i64,
        total_cost: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_status_round_trips_through_strings() {
        let all = [
            SessionStatus::Pending,
            SessionStatus::Accepted,
            SessionStatus::Rejected,
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ];
        for status in all {
            let s = status.to_string();
            assert_eq!(SessionStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(SessionStatus::Pending.to_string(), "pending");
        assert!(SessionStatus::from_str("paused").is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        for status in SessionStatus::NON_TERMINAL {
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn role_and_availability_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Consultant).unwrap(),
            "\"consultant\""
        );
        assert_eq!(
            serde_json::to_string(&Availability::Busy).unwrap(),
            "\"busy\""
        );
        let parsed: Availability = serde_json::from_str("\"online\"").unwrap();
        assert_eq!(parsed, Availability::Online);
    }

    #[test]
    fn session_view_flattens_session_fields() {
        let now = Utc::now();
        let user = |id: &str, role: UserRole| User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role,
            credits: 50.0,
            headline: None,
            bio: None,
            skills: vec![],
            price_per_minute: None,
            rating: 5.0,
            review_count: 0,
            category: "Development".into(),
            status: Availability::Offline,
            timezone: "UTC".into(),
            created_at: now,
            updated_at: now,
        };
        let client = user("u-client", UserRole::Client);
        let consultant = user("u-consultant", UserRole::Consultant);
        let session = Session {
            id: "s-1".into(),
            client_id: client.id.clone(),
            consultant_id: consultant.id.clone(),
            topic: "Rust lifetimes".into(),
            description: None,
            status: SessionStatus::Pending,
            created_at: now,
            scheduled_at: None,
            duration_minutes: 15,
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_seconds: 0,
            cost_per_minute: 2.0,
            total_cost: 0.0,
            is_paid: false,
        };

        let view = SessionView::hydrate(session, &client, &consultant);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "s-1");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["client"]["id"], "u-client");
        assert_eq!(json["consultant"]["role"], "consultant");
    }
}
