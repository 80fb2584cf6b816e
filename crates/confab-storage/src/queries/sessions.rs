// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session queries: creation, participant-indexed listing, and the
//! conditional status transitions that make concurrent lifecycle calls
//! safe.

use chrono::{DateTime, Utc};
use confab_core::{ConfabError, Session, SessionCompletion, SessionStatus};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{opt_ts_from_sql, opt_ts_to_sql, ts_from_sql, ts_to_sql};

const SESSION_COLUMNS: &str = "id, client_id, consultant_id, topic, description, status, \
     created_at, scheduled_at, duration_minutes, actual_start_time, actual_end_time, \
     actual_duration_seconds, cost_per_minute, total_cost, is_paid";

pub(crate) fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        client_id: row.get(1)?,
        consultant_id: row.get(2)?,
        topic: row.get(3)?,
        description: row.get(4)?,
        status: crate::queries::enum_from_sql(5, row.get(5)?)?,
        created_at: ts_from_sql(6, row.get(6)?)?,
        scheduled_at: opt_ts_from_sql(7, row.get(7)?)?,
        duration_minutes: row.get(8)?,
        actual_start_time: opt_ts_from_sql(9, row.get(9)?)?,
        actual_end_time: opt_ts_from_sql(10, row.get(10)?)?,
        actual_duration_seconds: row.get(11)?,
        cost_per_minute: row.get(12)?,
        total_cost: row.get(13)?,
        is_paid: row.get(14)?,
    })
}

/// Render a status set as a SQL IN list. Safe to inline: the strings come
/// from a closed enum, never from input.
fn status_in_list(statuses: &[SessionStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Insert a new session.
pub async fn create_session(db: &Database, session: &Session) -> Result<(), ConfabError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, client_id, consultant_id, topic, description, \
                 status, created_at, scheduled_at, duration_minutes, actual_start_time, \
                 actual_end_time, actual_duration_seconds, cost_per_minute, total_cost, is_paid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    session.id,
                    session.client_id,
                    session.consultant_id,
                    session.topic,
                    session.description,
                    session.status.to_string(),
                    ts_to_sql(&session.created_at),
                    opt_ts_to_sql(&session.scheduled_at),
                    session.duration_minutes,
                    opt_ts_to_sql(&session.actual_start_time),
                    opt_ts_to_sql(&session.actual_end_time),
                    session.actual_duration_seconds,
                    session.cost_per_minute,
                    session.total_cost,
                    session.is_paid,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, ConfabError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], session_from_row);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Sessions where the user participates (either side), newest first.
///
/// Indexed on both participant columns; never loads the whole table.
pub async fn list_for_user(
    db: &Database,
    user_id: &str,
    status: Option<SessionStatus>,
    limit: i64,
) -> Result<Vec<Session>, ConfabError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut sessions = Vec::new();
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions \
                         WHERE (client_id = ?1 OR consultant_id = ?1) AND status = ?2 \
                         ORDER BY created_at DESC LIMIT ?3"
                    ))?;
                    let rows = stmt.query_map(
                        params![user_id, status.to_string(), limit],
                        session_from_row,
                    )?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions \
                         WHERE client_id = ?1 OR consultant_id = ?1 \
                         ORDER BY created_at DESC LIMIT ?2"
                    ))?;
                    let rows =
                        stmt.query_map(params![user_id, limit], session_from_row)?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
            }
            Ok(sessions)
        })
        .await
        .map_err(map_tr_err)
}

/// Compare-and-swap on the status column.
pub async fn transition_status(
    db: &Database,
    id: &str,
    from: &[SessionStatus],
    to: SessionStatus,
) -> Result<bool, ConfabError> {
    let id = id.to_string();
    let in_list = status_in_list(from);
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE sessions SET status = ?1 WHERE id = ?2 AND status IN ({in_list})"
                ),
                params![to, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Accepted/active -> active, stamping `actual_start_time` on first entry
/// only (COALESCE keeps the original stamp on reconnects).
pub async fn mark_video_started(
    db: &Database,
    id: &str,
    started_at: DateTime<Utc>,
) -> Result<bool, ConfabError> {
    let id = id.to_string();
    let started_at = ts_to_sql(&started_at);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET status = 'active', \
                 actual_start_time = COALESCE(actual_start_time, ?1) \
                 WHERE id = ?2 AND status IN ('accepted', 'active')",
                params![started_at, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a completion atomically: the conditional session update, both
/// ledger writes, and the consultant's busy -> online reset commit
/// together or not at all. Returns false (writing nothing) when the
/// session was already terminal, which is what makes double completion a
/// no-op instead of a double charge.
pub async fn apply_completion(
    db: &Database,
    completion: &SessionCompletion,
) -> Result<bool, ConfabError> {
    let completion = completion.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute(
                "UPDATE sessions SET status = 'completed', actual_end_time = ?1, \
                 actual_duration_seconds = ?2, total_cost = ?3, is_paid = 1 \
                 WHERE id = ?4 AND status IN ('pending', 'accepted', 'active')",
                params![
                    ts_to_sql(&completion.ended_at),
                    completion.duration_seconds,
                    completion.cost,
                    completion.session_id,
                ],
            )?;
            if changed == 0 {
                // Already terminal; abandon the transaction untouched.
                return Ok(false);
            }

            if completion.cost != 0.0 {
                tx.execute(
                    "UPDATE users SET credits = credits - ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                    params![completion.cost, completion.client_id],
                )?;
                tx.execute(
                    "UPDATE users SET credits = credits + ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                    params![completion.cost, completion.consultant_id],
                )?;
            }

            tx.execute(
                "UPDATE users SET status = 'online',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'busy'",
                params![completion.consultant_id],
            )?;

            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}
