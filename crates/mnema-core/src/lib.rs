// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnema conversation engine.
//!
//! This crate provides the domain types, error type and adapter traits
//! shared by every other crate in the workspace. The external
//! collaborators (model inference, relational store, vector memory) are
//! expressed here purely as traits.

pub mod error;
pub mod profile;
pub mod traits;
pub mod types;

pub use error::MnemaError;
pub use profile::{Profile, ProfileField, ProfileUpdate};
pub use types::{
    AdapterType, ChatMessage, HealthStatus, ProviderRequest, ProviderResponse, Role, Session,
    SessionId, SummaryRecord, ToolCallRequest, ToolDefinition, ToolOutcome, ToolStatus, Turn, TurnPair,
};

pub use traits::{
    EmbeddingAdapter, PluginAdapter, ProviderAdapter, StorageAdapter, VectorMemoryAdapter,
};
