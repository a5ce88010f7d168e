// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock vector memory with substring ranking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, TurnPair, VectorMemoryAdapter,
};

/// Vector memory stand-in that ranks stored texts by shared words with the query.
#[derive(Clone, Default)]
pub struct MockVectorMemory {
    entries: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl MockVectorMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            fail: Arc::default(),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn entries(&self) -> Vec<String> {
        self.entries.lock().await.clone()
    }

    fn check(&self) -> Result<(), MnemaError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MnemaError::storage(std::io::Error::other(
                "vector store unavailable",
            )));
        }
        Ok(())
    }
}

fn overlap(query: &str, text: &str) -> usize {
    let text = text.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| text.contains(w))
        .count()
}

#[async_trait]
impl PluginAdapter for MockVectorMemory {
    fn name(&self) -> &str {
        "mock-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorMemory
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl VectorMemoryAdapter for MockVectorMemory {
    async fn upsert(&self, pair: &TurnPair) -> Result<(), MnemaError> {
        self.check()?;
        self.entries.lock().await.push(pair.render());
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MnemaError> {
        self.check()?;
        let entries = self.entries.lock().await;
        let mut scored: Vec<(usize, &String)> =
            entries.iter().map(|e| (overlap(query, e), e)).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, e)| e.clone()).collect())
    }
}
