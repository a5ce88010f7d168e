// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline embedder based on signed feature hashing.
//!
//! Lowercased word unigrams and bigrams are hashed with SHA-256 into a fixed
//! number of buckets. The result is stable across runs and platforms, so
//! vectors written by one process can be searched by the next.

use async_trait::async_trait;
use mnema_core::types::{EmbeddingInput, EmbeddingOutput};
use mnema_core::{AdapterType, EmbeddingAdapter, HealthStatus, MnemaError, PluginAdapter};
use sha2::{Digest, Sha256};

use crate::types::l2_normalize;

pub const DEFAULT_HASHING_DIMENSIONS: usize = 512;

/// Feature-hashing [`EmbeddingAdapter`] that needs no network or model files.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embeds a single text.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0_f32; self.dimensions];
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        for word in &words {
            self.add_feature(&mut vec, word, 1.0);
        }
        for pair in words.windows(2) {
            self.add_feature(&mut vec, &format!("{} {}", pair[0], pair[1]), 0.5);
        }
        l2_normalize(&mut vec);
        vec
    }

    fn add_feature(&self, vec: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSIONS)
    }
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HashingEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemaError> {
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.embed_text(t)).collect(),
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::cosine_similarity;

    #[test]
    fn deterministic() {
        let e = HashingEmbedder::default();
        assert_eq!(e.embed_text("Hello world"), e.embed_text("hello, WORLD!"));
    }

    #[test]
    fn related_text_scores_higher() {
        let e = HashingEmbedder::default();
        let query = e.embed_text("favourite tea");
        let related = e.embed_text("I love green tea, it is my favourite drink");
        let unrelated = e.embed_text("the train to Milan leaves at noon");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashingEmbedder::new(8);
        assert_eq!(e.embed_text("  "), vec![0.0; 8]);
    }

    #[tokio::test]
    async fn embeds_batches() {
        let e = HashingEmbedder::new(16);
        let out = e
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.dimensions, 16);
    }
}
