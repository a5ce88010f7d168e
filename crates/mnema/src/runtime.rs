// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter wiring shared by the subcommands.

use std::sync::Arc;

use mnema_agent::AgentDeps;
use mnema_config::MnemaConfig;
use mnema_core::{EmbeddingAdapter, MnemaError, StorageAdapter, VectorMemoryAdapter};
use mnema_memory::embedder::DEFAULT_HASHING_DIMENSIONS;
use mnema_memory::{DisabledMemory, HashingEmbedder, MemoryStore, VectorMemory};
use mnema_mistral::{MistralEmbedder, MistralProvider};
use mnema_storage::SqliteStorage;
use tracing::info;

/// Opens and migrates the relational store.
pub async fn open_storage(config: &MnemaConfig) -> Result<Arc<SqliteStorage>, MnemaError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Builds every collaborator an agent needs.
pub async fn build_deps(config: &MnemaConfig) -> Result<AgentDeps, MnemaError> {
    let storage = open_storage(config).await?;
    let provider = MistralProvider::new(&config.provider).inspect_err(|_| {
        eprintln!(
            "error: Mistral API key required. Set provider.api_key, MNEMA_PROVIDER_API_KEY or MISTRAL_API_KEY"
        );
    })?;

    let memory: Arc<dyn VectorMemoryAdapter> = if config.memory.enabled {
        let embedder: Arc<dyn EmbeddingAdapter> = match config.memory.embedder.as_str() {
            "hashing" => Arc::new(HashingEmbedder::new(DEFAULT_HASHING_DIMENSIONS)),
            _ => Arc::new(MistralEmbedder::new(
                provider.client().clone(),
                config.memory.embedding_model.clone(),
            )),
        };
        let store = MemoryStore::new(storage.database()?.clone());
        info!(
            embedder = %config.memory.embedder,
            collection = %config.memory.collection,
            "vector memory enabled"
        );
        Arc::new(VectorMemory::new(embedder, store, &config.memory))
    } else {
        info!("vector memory disabled by configuration");
        Arc::new(DisabledMemory)
    };

    let storage: Arc<dyn StorageAdapter> = storage;
    Ok(AgentDeps {
        provider: Arc::new(provider),
        storage,
        memory,
    })
}
