// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine-ranked vector memory over [`MemoryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use mnema_config::model::MemoryConfig;
use mnema_core::types::EmbeddingInput;
use mnema_core::{
    AdapterType, EmbeddingAdapter, HealthStatus, MnemaError, PluginAdapter, TurnPair,
    VectorMemoryAdapter,
};
use tracing::debug;

use crate::store::MemoryStore;
use crate::types::{cosine_similarity, l2_normalize, ScoredMemory};

/// Vector memory that embeds finished pairs and ranks them by cosine similarity.
///
/// Every stored vector of the collection is scored on each search; collections
/// stay small (one row per conversation turn) so a brute-force scan is enough.
pub struct VectorMemory {
    embedder: Arc<dyn EmbeddingAdapter>,
    store: MemoryStore,
    collection: String,
    similarity_threshold: f32,
}

impl VectorMemory {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, store: MemoryStore, config: &MemoryConfig) -> Self {
        Self {
            embedder,
            store,
            collection: config.collection.clone(),
            similarity_threshold: config.similarity_threshold,
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MnemaError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        let mut vec = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MnemaError::Internal("embedder returned no vectors".into()))?;
        l2_normalize(&mut vec);
        Ok(vec)
    }

    /// Ranked matches with their scores, best first.
    pub async fn search_scored(&self, query: &str, k: usize) -> Result<Vec<ScoredMemory>, MnemaError> {
        let query_vec = self.embed_one(query).await?;
        let candidates = self.store.load_collection(&self.collection).await?;

        let total = candidates.len();
        let mut scored: Vec<ScoredMemory> = candidates
            .into_iter()
            .filter(|(_, vec)| vec.len() == query_vec.len())
            .map(|(content, vec)| ScoredMemory {
                score: cosine_similarity(&query_vec, &vec),
                content,
            })
            .filter(|m| m.score >= self.similarity_threshold)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(
            collection = %self.collection,
            candidates = total,
            dimensions = query_vec.len(),
            matches = scored.len(),
            top_score = scored.first().map(|m| m.score),
            "vector search complete"
        );
        Ok(scored)
    }
}

#[async_trait]
impl PluginAdapter for VectorMemory {
    fn name(&self) -> &str {
        "sqlite-vector-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorMemory
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        self.store.count(&self.collection).await?;
        self.embedder.health_check().await
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        self.embedder.shutdown().await
    }
}

#[async_trait]
impl VectorMemoryAdapter for VectorMemory {
    async fn upsert(&self, pair: &TurnPair) -> Result<(), MnemaError> {
        let text = pair.render();
        let vec = self.embed_one(&text).await?;
        let id = self.store.insert(&self.collection, &text, &vec).await?;
        debug!(id, collection = %self.collection, "pair stored in vector memory");
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MnemaError> {
        Ok(self
            .search_scored(query, k)
            .await?
            .into_iter()
            .map(|m| m.content)
            .collect())
    }
}
