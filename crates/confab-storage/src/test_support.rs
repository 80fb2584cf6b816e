// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the storage test suites.

use chrono::Utc;
use confab_core::{Availability, Session, SessionStatus, User, UserRole};

pub(crate) fn make_user(id: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        role,
        credits: 50.0,
        headline: None,
        bio: None,
        skills: vec![],
        price_per_minute: None,
        rating: 5.0,
        review_count: 0,
        category: "Development".to_string(),
        status: Availability::Offline,
        timezone: "UTC".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn make_session(id: &str, client_id: &str, consultant_id: &str) -> Session {
    Session {
        id: id.to_string(),
        client_id: client_id.to_string(),
        consultant_id: consultant_id.to_string(),
        topic: "Borrow checker triage".to_string(),
        description: None,
        status: SessionStatus::Pending,
        created_at: Utc::now(),
        scheduled_at: None,
        duration_minutes: 15,
        actual_start_time: None,
        actual_end_time: None,
        actual_duration_seconds: 0,
        cost_per_minute: 2.0,
        total_cost: 0.0,
        is_paid: false,
    }
}
