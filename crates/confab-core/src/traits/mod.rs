// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the core and its collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod auth;
pub mod notify;
pub mod store;

pub use auth::TokenVerifier;
pub use notify::Notifier;
pub use store::MarketStore;
