// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote embeddings via the Mistral `/embeddings` endpoint.

use async_trait::async_trait;
use mnema_core::types::{EmbeddingInput, EmbeddingOutput};
use mnema_core::{AdapterType, EmbeddingAdapter, HealthStatus, MnemaError, PluginAdapter};
use tracing::debug;

use crate::client::MistralClient;
use crate::types::EmbeddingRequest;

/// Output size of `mistral-embed`.
pub const MISTRAL_EMBED_DIMENSIONS: usize = 1024;

/// [`EmbeddingAdapter`] backed by the Mistral embeddings API.
pub struct MistralEmbedder {
    client: MistralClient,
    model: String,
    dimensions: usize,
}

impl MistralEmbedder {
    pub fn new(client: MistralClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions: MISTRAL_EMBED_DIMENSIONS,
        }
    }
}

#[async_trait]
impl PluginAdapter for MistralEmbedder {
    fn name(&self) -> &str {
        "mistral-embed"
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
impl EmbeddingAdapter for MistralEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemaError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: self.dimensions,
            });
        }

        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response = self.client.embeddings(&request).await?;
        response.data.sort_by_key(|d| d.index);

        if response.data.len() != expected {
            return Err(MnemaError::Provider {
                message: format!(
                    "embeddings response has {} vectors for {expected} inputs",
                    response.data.len()
                ),
                source: None,
            });
        }

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        let dimensions = embeddings.first().map_or(self.dimensions, Vec::len);
        debug!(count = embeddings.len(), dimensions, "embeddings generated");
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
