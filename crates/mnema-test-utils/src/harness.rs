// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end agent tests.
//!
//! `TestHarness` assembles an [`Agent`] with a [`MockProvider`], a
//! [`MockVectorMemory`] and either [`MemoryStorage`] or a SQLite database in
//! a temp directory.

use std::sync::Arc;

use mnema_agent::{Agent, AgentDeps, TurnReport};
use mnema_config::model::{MnemaConfig, StorageConfig};
use mnema_core::{MnemaError, Session, StorageAdapter};
use mnema_storage::SqliteStorage;

use crate::mock_memory::MockVectorMemory;
use crate::mock_provider::{MockProvider, MockReply};
use crate::mock_storage::MemoryStorage;

/// Builder for test environments.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    config: MnemaConfig,
    sqlite: bool,
    memory_entries: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            config: MnemaConfig::default(),
            sqlite: false,
            memory_entries: Vec::new(),
        }
    }

    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Adjusts the configuration before the agent is built.
    pub fn with_config(mut self, edit: impl FnOnce(&mut MnemaConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Uses SQLite in a temp directory instead of [`MemoryStorage`].
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn with_memory_entries(mut self, entries: Vec<String>) -> Self {
        self.memory_entries = entries;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MnemaError> {
        let provider = MockProvider::with_replies(self.replies);
        let memory = MockVectorMemory::with_entries(self.memory_entries);
        let memory_storage = MemoryStorage::new();

        let (storage, temp_dir): (Arc<dyn StorageAdapter>, _) = if self.sqlite {
            let temp_dir = tempfile::TempDir::new().map_err(MnemaError::storage)?;
            let storage = SqliteStorage::new(StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
            });
            storage.initialize().await?;
            (Arc::new(storage), Some(temp_dir))
        } else {
            (Arc::new(memory_storage.clone()), None)
        };

        let deps = AgentDeps {
            provider: Arc::new(provider.clone()),
            storage: storage.clone(),
            memory: Arc::new(memory.clone()),
        };
        let session = Session::new("test-session", self.config.agent.user_id.clone());
        let agent = Agent::with_session(&self.config, deps, session).await?;

        Ok(TestHarness {
            agent,
            provider,
            memory,
            memory_storage,
            storage,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete agent stack over mock adapters.
pub struct TestHarness {
    pub agent: Agent,
    pub provider: MockProvider,
    pub memory: MockVectorMemory,
    /// The in-memory store; only wired in when SQLite is not used.
    pub memory_storage: MemoryStorage,
    pub storage: Arc<dyn StorageAdapter>,
    pub config: MnemaConfig,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs one turn and waits for the deferred memory upsert.
    pub async fn send(&mut self, message: &str) -> TurnReport {
        let report = self.agent.turn(message).await;
        self.agent.flush_memory().await;
        report
    }

    /// Pairs persisted for the harness session.
    pub async fn persisted_pairs(&self) -> Result<u64, MnemaError> {
        self.storage.count_pairs("test-session").await
    }
}
