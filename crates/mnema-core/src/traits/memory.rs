// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector memory trait: semantic upsert and search over past exchanges.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::TurnPair;

/// Long-term semantic memory of past question/answer pairs.
#[async_trait]
pub trait VectorMemoryAdapter: PluginAdapter {
    /// Embeds and stores a finished pair.
    async fn upsert(&self, pair: &TurnPair) -> Result<(), MnemaError>;

    /// Returns up to `k` stored texts ranked by similarity to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MnemaError>;
}
