// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Confab consultation marketplace.
//!
//! This crate provides the domain entities, the error taxonomy, and the
//! seam traits (storage, credential verification, notifications) used
//! throughout the Confab workspace. It contains no I/O of its own.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConfabError;
pub use traits::{MarketStore, Notifier, TokenVerifier};
pub use types::{
    Availability, ConsultantQuery, Message, NotificationEvent, Review, Session,
    SessionCompletion, SessionStatus, SessionView, User, UserRole, UserSummary,
};
