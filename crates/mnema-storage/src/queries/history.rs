// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only `chat_history` table.
//!
//! Ordering uses the autoincrement row id, not the timestamp, so pairs written
//! within the same millisecond keep their insertion order.

use mnema_core::{MnemaError, TurnPair};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::SessionOverview;

/// Inserts one question/answer pair and returns its row id.
pub async fn insert_pair(
    db: &Database,
    session_id: &str,
    user_id: &str,
    pair: &TurnPair,
) -> Result<i64, MnemaError> {
    let session_id = session_id.to_string();
    let user_id = user_id.to_string();
    let pair = pair.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO chat_history (user_id, session_id, question, answer)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, session_id, pair.user, pair.assistant],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// The latest `n` pairs of a session, oldest first.
pub async fn recent_pairs(
    db: &Database,
    session_id: &str,
    n: usize,
) -> Result<Vec<TurnPair>, MnemaError> {
    let session_id = session_id.to_string();
    let limit = i64::try_from(n).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<TurnPair>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT question, answer FROM chat_history
                 WHERE session_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![session_id, limit], |row| {
                Ok(TurnPair {
                    user: row.get(0)?,
                    assistant: row.get(1)?,
                })
            })?;
            let mut pairs = rows.collect::<Result<Vec<_>, _>>()?;
            pairs.reverse();
            Ok(pairs)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of pairs stored for a session.
pub async fn count_pairs(db: &Database, session_id: &str) -> Result<u64, MnemaError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM chat_history WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// All sessions with stored pairs, most recently active first.
pub async fn list_sessions(db: &Database) -> Result<Vec<SessionOverview>, MnemaError> {
    db.connection()
        .call(|conn| -> Result<Vec<SessionOverview>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT session_id, COUNT(*), MAX(timestamp), MAX(id) AS last_id
                 FROM chat_history
                 GROUP BY session_id
                 ORDER BY last_id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                let pairs: i64 = row.get(1)?;
                Ok(SessionOverview {
                    session_id: row.get(0)?,
                    pairs: pairs.max(0) as u64,
                    last_at: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
