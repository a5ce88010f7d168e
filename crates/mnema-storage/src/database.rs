// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use mnema_core::MnemaError;
use tracing::debug;

use crate::migrations;

/// Handle to an open, migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode.
    pub async fn open(path: &str) -> Result<Self, MnemaError> {
        Self::open_with(path, true).await
    }

    /// Opens the database at `path`, applies PRAGMAs and runs migrations.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, MnemaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(MnemaError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(MnemaError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, MnemaError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(MnemaError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), MnemaError> {
        self.conn
            .call(move |conn| -> Result<(), MnemaError> {
                apply_pragmas(conn, wal_mode).map_err(MnemaError::storage)?;
                migrations::run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)
    }

    /// The shared async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), MnemaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

fn apply_pragmas(conn: &rusqlite::Connection, wal_mode: bool) -> Result<(), rusqlite::Error> {
    if wal_mode {
        // journal_mode returns a row, so it cannot go through execute_batch.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    }
    conn.execute_batch(
        "PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
}

/// Converts a tokio-rusqlite call error into a storage error.
pub fn map_tr_err<E: std::fmt::Display>(err: tokio_rusqlite::Error<E>) -> MnemaError {
    MnemaError::Storage {
        source: err.to_string().into(),
    }
}
