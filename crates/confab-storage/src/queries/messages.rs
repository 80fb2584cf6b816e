// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message queries.

use confab_core::{ConfabError, Message};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{ts_from_sql, ts_to_sql};

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        sent_at: ts_from_sql(4, row.get(4)?)?,
    })
}

/// Insert a new chat message.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ConfabError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, session_id, sender_id, content, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.id,
                    msg.session_id,
                    msg.sender_id,
                    msg.content,
                    ts_to_sql(&msg.sent_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Messages for a session in chronological order.
pub async fn list_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<Message>, ConfabError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, sender_id, content, sent_at
                 FROM messages WHERE session_id = ?1 ORDER BY sent_at ASC",
            )?;
            let rows = stmt.query_map(params![session_id], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{sessions, users};
    use crate::test_support::{make_session, make_user};
    use chrono::Utc;
    use confab_core::UserRole;

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        users::create_user(&db, &make_user("client-1", UserRole::Client))
            .await
            .unwrap();
        users::create_user(&db, &make_user("cons-1", UserRole::Consultant))
            .await
            .unwrap();
        sessions::create_session(&db, &make_session("s-1", "client-1", "cons-1"))
            .await
            .unwrap();
        db
    }

    fn make_message(id: &str, sender: &str, content: &str, offset_secs: i64) -> Message {
        Message {
            id: id.to_string(),
            session_id: "s-1".to_string(),
            sender_id: sender.to_string(),
            content: content.to_string(),
            sent_at: Utc::now() + chrono::Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn insert_and_list_in_chronological_order() {
        let db = setup().await;
        insert_message(&db, &make_message("m-2", "cons-1", "hi back", 10))
            .await
            .unwrap();
        insert_message(&db, &make_message("m-1", "client-1", "hello", 0))
            .await
            .unwrap();

        let messages = list_for_session(&db, "s-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m-1");
        assert_eq!(messages[1].id, "m-2");
        assert_eq!(messages[0].sender_id, "client-1");
    }

    #[tokio::test]
    async fn list_is_scoped_to_session() {
        let db = setup().await;
        insert_message(&db, &make_message("m-1", "client-1", "hello", 0))
            .await
            .unwrap();
        let other = list_for_session(&db, "s-other").await.unwrap();
        assert!(other.is_empty());
    }
}
