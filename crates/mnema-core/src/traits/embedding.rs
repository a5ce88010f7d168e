// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Dimensionality of the vectors this adapter produces.
    fn dimensions(&self) -> usize;

    /// Generates one embedding per input text.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemaError>;
}
