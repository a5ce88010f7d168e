// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use mnema_config::model::StorageConfig;
use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, Profile, ProfileUpdate, StorageAdapter,
    SummaryRecord, TurnPair,
};

use crate::database::{map_tr_err, Database};
use crate::models::SessionOverview;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, MnemaError> {
        self.db.get().ok_or_else(|| MnemaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// All sessions with stored history, most recently active first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionOverview>, MnemaError> {
        queries::history::list_sessions(self.database()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        self.database()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MnemaError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MnemaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MnemaError> {
        self.database()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn get_profile(&self) -> Result<Profile, MnemaError> {
        queries::profile::get_profile(self.database()?).await
    }

    async fn merge_profile(&self, update: &ProfileUpdate) -> Result<Profile, MnemaError> {
        queries::profile::merge_profile(self.database()?, update).await
    }

    async fn insert_pair(
        &self,
        session_id: &str,
        user_id: &str,
        pair: &TurnPair,
    ) -> Result<i64, MnemaError> {
        queries::history::insert_pair(self.database()?, session_id, user_id, pair).await
    }

    async fn recent_pairs(&self, session_id: &str, n: usize) -> Result<Vec<TurnPair>, MnemaError> {
        queries::history::recent_pairs(self.database()?, session_id, n).await
    }

    async fn count_pairs(&self, session_id: &str) -> Result<u64, MnemaError> {
        queries::history::count_pairs(self.database()?, session_id).await
    }

    async fn insert_summary(
        &self,
        session_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<i64, MnemaError> {
        queries::summaries::insert_summary(self.database()?, session_id, user_id, text).await
    }

    async fn latest_summary(&self, session_id: &str) -> Result<Option<SummaryRecord>, MnemaError> {
        queries::summaries::latest_summary(self.database()?, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn identity() {
        let storage = SqliteStorage::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let storage = SqliteStorage::new(make_config("never.db"));
        assert!(storage.health_check().await.is_err());
        let err = storage
            .insert_pair("s", "u", &TurnPair::new("q", "a"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn history_and_summaries_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("adapter.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);

        for i in 1..=3 {
            storage
                .insert_pair("s", "u", &TurnPair::new(format!("Q{i}"), format!("A{i}")))
                .await
                .unwrap();
        }
        assert_eq!(storage.count_pairs("s").await.unwrap(), 3);
        assert_eq!(storage.recent_pairs("s", 2).await.unwrap()[0].user, "Q2");

        storage.insert_summary("s", "u", "digest").await.unwrap();
        let latest = storage.latest_summary("s").await.unwrap().unwrap();
        assert_eq!(latest.text, "digest");

        let sessions = storage.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("durable.db");
        let path = db_path.to_str().unwrap();

        let storage = SqliteStorage::new(make_config(path));
        storage.initialize().await.unwrap();
        let update = ProfileUpdate::from_map(
            serde_json::json!({"location": "Italy"}).as_object().unwrap(),
        )
        .unwrap();
        storage.merge_profile(&update).await.unwrap();
        storage.shutdown().await.unwrap();
        drop(storage);

        let reopened = SqliteStorage::new(make_config(path));
        reopened.initialize().await.unwrap();
        let profile = reopened.get_profile().await.unwrap();
        assert_eq!(profile.location.as_deref(), Some("Italy"));
    }
}
