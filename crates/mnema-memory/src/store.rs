// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed memory store with vector BLOB storage.

use mnema_core::MnemaError;
use mnema_storage::database::map_tr_err;
use mnema_storage::Database;

use crate::types::{blob_to_vec, vec_to_blob};

/// Persistent store for embedded texts, partitioned by collection.
#[derive(Clone)]
pub struct MemoryStore {
    db: Database,
}

impl MemoryStore {
    /// Wraps a migrated database (the `memories` table must exist).
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Appends a text and its embedding to `collection`.
    pub async fn insert(
        &self,
        collection: &str,
        content: &str,
        embedding: &[f32],
    ) -> Result<i64, MnemaError> {
        let collection = collection.to_string();
        let content = content.to_string();
        let blob = vec_to_blob(embedding);
        self.db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO memories (collection, content, embedding) VALUES (?1, ?2, ?3)",
                    rusqlite::params![collection, content, blob],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Loads every `(content, embedding)` of a collection, oldest first.
    pub async fn load_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, Vec<f32>)>, MnemaError> {
        let collection = collection.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<(String, Vec<f32>)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT content, embedding FROM memories WHERE collection = ?1 ORDER BY id",
                )?;
                let rows = stmt.query_map([collection], |row| {
                    let blob: Vec<u8> = row.get(1)?;
                    Ok((row.get::<_, String>(0)?, blob_to_vec(&blob)))
                })?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    pub async fn count(&self, collection: &str) -> Result<u64, MnemaError> {
        let collection = collection.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM memories WHERE collection = ?1",
                    [collection],
                    |row| row.get(0),
                )
            })
            .await
            .map(|n| n.max(0) as u64)
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_load_by_collection() {
        let store = MemoryStore::new(Database::open_in_memory().await.unwrap());
        store.insert("a", "first", &[1.0, 0.0]).await.unwrap();
        store.insert("a", "second", &[0.0, 1.0]).await.unwrap();
        store.insert("b", "other", &[1.0, 1.0]).await.unwrap();

        let loaded = store.load_collection("a").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], ("first".to_string(), vec![1.0, 0.0]));
        assert_eq!(store.count("b").await.unwrap(), 1);
        assert_eq!(store.count("missing").await.unwrap(), 0);
    }
}
