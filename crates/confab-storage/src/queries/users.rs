// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account queries, including the ledger writes.

use confab_core::{Availability, ConfabError, ConsultantQuery, User};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{enum_from_sql, ts_from_sql, ts_to_sql};

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, credits, headline, bio, \
     skills, price_per_minute, rating, review_count, category, status, timezone, \
     created_at, updated_at";

pub(crate) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let skills_json: String = row.get(8)?;
    let skills = serde_json::from_str(&skills_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: enum_from_sql(4, row.get(4)?)?,
        credits: row.get(5)?,
        headline: row.get(6)?,
        bio: row.get(7)?,
        skills,
        price_per_minute: row.get(9)?,
        rating: row.get(10)?,
        review_count: row.get(11)?,
        category: row.get(12)?,
        status: enum_from_sql(13, row.get(13)?)?,
        timezone: row.get(14)?,
        created_at: ts_from_sql(15, row.get(15)?)?,
        updated_at: ts_from_sql(16, row.get(16)?)?,
    })
}

/// Insert a new user account.
pub async fn create_user(db: &Database, user: &User) -> Result<(), ConfabError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let skills = serde_json::to_string(&user.skills).unwrap_or_else(|_| "[]".into());
            conn.execute(
                "INSERT INTO users (id, email, first_name, last_name, role, credits, headline, \
                 bio, skills, price_per_minute, rating, review_count, category, status, \
                 timezone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    user.id,
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.role.to_string(),
                    user.credits,
                    user.headline,
                    user.bio,
                    skills,
                    user.price_per_minute,
                    user.rating,
                    user.review_count,
                    user.category,
                    user.status.to_string(),
                    user.timezone,
                    ts_to_sql(&user.created_at),
                    ts_to_sql(&user.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by ID.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, ConfabError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], user_from_row);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Persist profile fields. Deliberately never touches `role` or `credits`.
pub async fn update_profile(db: &Database, user: &User) -> Result<(), ConfabError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let skills = serde_json::to_string(&user.skills).unwrap_or_else(|_| "[]".into());
            conn.execute(
                "UPDATE users SET first_name = ?1, last_name = ?2, headline = ?3, bio = ?4, \
                 skills = ?5, price_per_minute = ?6, category = ?7, status = ?8, \
                 timezone = ?9, updated_at = ?10 WHERE id = ?11",
                params![
                    user.first_name,
                    user.last_name,
                    user.headline,
                    user.bio,
                    skills,
                    user.price_per_minute,
                    user.category,
                    user.status.to_string(),
                    user.timezone,
                    ts_to_sql(&user.updated_at),
                    user.id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a signed delta to a user's credit balance. Returns whether the
/// user exists.
pub async fn adjust_credits(
    db: &Database,
    user_id: &str,
    delta: f64,
) -> Result<bool, ConfabError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET credits = credits + ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                params![delta, user_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Set a user's availability status.
pub async fn set_availability(
    db: &Database,
    user_id: &str,
    status: Availability,
) -> Result<(), ConfabError> {
    let user_id = user_id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET status = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                params![status, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Busy -> online, conditional so an offline consultant stays offline.
pub async fn reset_busy(db: &Database, user_id: &str) -> Result<(), ConfabError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET status = 'online',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'busy'",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Consultant directory with store-level filtering.
pub async fn list_consultants(
    db: &Database,
    query: &ConsultantQuery,
) -> Result<Vec<User>, ConfabError> {
    let query = query.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role = 'consultant'"
            );
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(ref category) = query.category {
                if category != "All" {
                    params.push(Box::new(category.clone()));
                    sql.push_str(&format!(" AND category = ?{}", params.len()));
                }
            }
            if let Some(ref search) = query.search {
                let pattern = format!("%{search}%");
                params.push(Box::new(pattern));
                let n = params.len();
                sql.push_str(&format!(
                    " AND (first_name LIKE ?{n} OR last_name LIKE ?{n} \
                     OR headline LIKE ?{n} OR skills LIKE ?{n})"
                ));
            }

            params.push(Box::new(query.limit));
            sql.push_str(&format!(" ORDER BY rating DESC, review_count DESC LIMIT ?{}", params.len()));
            params.push(Box::new(query.skip));
            sql.push_str(&format!(" OFFSET ?{}", params.len()));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                user_from_row,
            )?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}
