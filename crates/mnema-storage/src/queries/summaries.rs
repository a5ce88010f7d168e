// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only `summary` table. Only the newest row per session is ever read.

use mnema_core::{MnemaError, SummaryRecord};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

pub async fn insert_summary(
    db: &Database,
    session_id: &str,
    user_id: &str,
    text: &str,
) -> Result<i64, MnemaError> {
    let session_id = session_id.to_string();
    let user_id = user_id.to_string();
    let text = text.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO summary (user_id, session_id, summary_text) VALUES (?1, ?2, ?3)",
                params![user_id, session_id, text],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn latest_summary(
    db: &Database,
    session_id: &str,
) -> Result<Option<SummaryRecord>, MnemaError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<SummaryRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, session_id, user_id, summary_text, timestamp
                 FROM summary WHERE session_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![session_id],
                |row| {
                    Ok(SummaryRecord {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        user_id: row.get(2)?,
                        text: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn latest_wins() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(latest_summary(&db, "s").await.unwrap().is_none());

        insert_summary(&db, "s", "u", "first").await.unwrap();
        let second = insert_summary(&db, "s", "u", "second").await.unwrap();
        insert_summary(&db, "other", "u", "elsewhere").await.unwrap();

        let latest = latest_summary(&db, "s").await.unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.text, "second");
        assert_eq!(latest.user_id, "u");
    }
}
