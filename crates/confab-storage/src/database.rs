// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use confab_core::ConfabError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into ConfabError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConfabError {
    ConfabError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database behind a single async write thread.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ConfabError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfabError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConfabError::Storage {
                source: Box::new(e),
            })?;

        let db = Self { conn };
        db.configure(wal_mode).await?;
        db.migrate().await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open an in-memory database with the full schema applied. Test use.
    pub async fn open_in_memory() -> Result<Self, ConfabError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ConfabError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure(false).await?;
        db.migrate().await?;
        Ok(db)
    }

    async fn configure(&self, wal_mode: bool) -> Result<(), ConfabError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn migrate(&self) -> Result<(), ConfabError> {
        self.conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| ConfabError::Storage {
                source: Box::new(e),
            })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL ahead of shutdown.
    pub async fn close(&self) -> Result<(), ConfabError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
