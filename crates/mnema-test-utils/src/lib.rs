// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnema integration tests.
//!
//! Provides mock adapters and a harness for fast, deterministic tests
//! without a model API.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted model replies with request capture
//! - [`MemoryStorage`] - in-memory relational store with failure injection
//! - [`MockVectorMemory`] - word-overlap vector memory
//! - [`TestHarness`] - a complete [`Agent`](mnema_agent::Agent) wired to the mocks

pub mod harness;
pub mod mock_memory;
pub mod mock_provider;
pub mod mock_storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_memory::MockVectorMemory;
pub use mock_provider::{MockProvider, MockReply};
pub use mock_storage::MemoryStorage;
