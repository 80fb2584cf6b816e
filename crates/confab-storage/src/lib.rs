// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Confab marketplace.
//!
//! Implements [`confab_core::MarketStore`] on top of rusqlite behind
//! tokio-rusqlite's single background write thread, with refinery-managed
//! schema migrations.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use database::Database;
pub use store::SqliteStore;
