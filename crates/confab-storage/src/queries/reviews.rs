// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review queries. The session_id UNIQUE constraint backs the
//! one-review-per-session invariant at the deepest layer.

use confab_core::{ConfabError, Review};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{ts_from_sql, ts_to_sql};

fn review_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        session_id: row.get(1)?,
        client_id: row.get(2)?,
        consultant_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: ts_from_sql(6, row.get(6)?)?,
    })
}

/// Insert a new review.
pub async fn create_review(db: &Database, review: &Review) -> Result<(), ConfabError> {
    let review = review.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reviews (id, session_id, client_id, consultant_id, rating, \
                 comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    review.id,
                    review.session_id,
                    review.client_id,
                    review.consultant_id,
                    review.rating,
                    review.comment,
                    ts_to_sql(&review.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The review for a session, if one exists.
pub async fn find_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Option<Review>, ConfabError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, client_id, consultant_id, rating, comment, created_at
                 FROM reviews WHERE session_id = ?1",
            )?;
            let result = stmt.query_row(params![session_id], review_from_row);
            match result {
                Ok(review) => Ok(Some(review)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All reviews for a consultant, newest first.
pub async fn list_for_consultant(
    db: &Database,
    consultant_id: &str,
) -> Result<Vec<Review>, ConfabError> {
    let consultant_id = consultant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, client_id, consultant_id, rating, comment, created_at
                 FROM reviews WHERE consultant_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map(params![consultant_id], review_from_row)?;
            let mut reviews = Vec::new();
            for row in rows {
                reviews.push(row?);
            }
            Ok(reviews)
        })
        .await
        .map_err(map_tr_err)
}
