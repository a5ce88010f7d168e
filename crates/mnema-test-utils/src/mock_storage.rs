// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `StorageAdapter` with failure injection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, Profile, ProfileUpdate, StorageAdapter,
    SummaryRecord, TurnPair,
};

#[derive(Default)]
struct Tables {
    profile: Profile,
    /// (session_id, pair), in insertion order.
    history: Vec<(String, TurnPair)>,
    summaries: Vec<SummaryRecord>,
}

/// Storage kept entirely in memory.
///
/// `fail_writes` makes every write return a storage error, which lets
/// tests exercise the degraded paths of the engine.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Every stored pair of the session, oldest first.
    pub async fn pairs(&self, session_id: &str) -> Vec<TurnPair> {
        self.tables
            .lock()
            .await
            .history
            .iter()
            .filter(|(s, _)| s == session_id)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub async fn summaries(&self) -> Vec<SummaryRecord> {
        self.tables.lock().await.summaries.clone()
    }

    fn check_write(&self) -> Result<(), MnemaError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MnemaError::storage(std::io::Error::other(
                "injected write failure",
            )));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), MnemaError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MnemaError::storage(std::io::Error::other(
                "injected read failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), MnemaError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), MnemaError> {
        Ok(())
    }

    async fn get_profile(&self) -> Result<Profile, MnemaError> {
        self.check_read()?;
        Ok(self.tables.lock().await.profile.clone())
    }

    async fn merge_profile(&self, update: &ProfileUpdate) -> Result<Profile, MnemaError> {
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables.profile.apply(update);
        Ok(tables.profile.clone())
    }

    async fn insert_pair(
        &self,
        session_id: &str,
        _user_id: &str,
        pair: &TurnPair,
    ) -> Result<i64, MnemaError> {
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables.history.push((session_id.to_string(), pair.clone()));
        Ok(tables.history.len() as i64)
    }

    async fn recent_pairs(&self, session_id: &str, n: usize) -> Result<Vec<TurnPair>, MnemaError> {
        self.check_read()?;
        let all = self.pairs(session_id).await;
        let skip = all.len().saturating_sub(n);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn count_pairs(&self, session_id: &str) -> Result<u64, MnemaError> {
        self.check_read()?;
        Ok(self.pairs(session_id).await.len() as u64)
    }

    async fn insert_summary(
        &self,
        session_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<i64, MnemaError> {
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        let id = tables.summaries.len() as i64 + 1;
        tables.summaries.push(SummaryRecord {
            id,
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: format!("t{id}"),
        });
        Ok(id)
    }

    async fn latest_summary(&self, session_id: &str) -> Result<Option<SummaryRecord>, MnemaError> {
        self.check_read()?;
        Ok(self
            .tables
            .lock()
            .await
            .summaries
            .iter()
            .rev()
            .find(|s| s.session_id == session_id)
            .cloned())
    }
}
