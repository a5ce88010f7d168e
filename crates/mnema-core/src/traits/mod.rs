// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Mnema collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod memory;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use memory::VectorMemoryAdapter;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
