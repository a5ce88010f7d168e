// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term vector memory for the Mnema conversation engine.
//!
//! - **HashingEmbedder**: offline feature-hashing embedder
//! - **MemoryStore**: SQLite persistence with BLOB vectors
//! - **VectorMemory**: [`mnema_core::VectorMemoryAdapter`] over an embedder and the store
//! - **DisabledMemory**: no-op adapter for deployments without long-term memory

pub mod disabled;
pub mod embedder;
pub mod retriever;
pub mod store;
pub mod types;

pub use disabled::DisabledMemory;
pub use embedder::HashingEmbedder;
pub use retriever::VectorMemory;
pub use store::MemoryStore;
pub use types::*;
