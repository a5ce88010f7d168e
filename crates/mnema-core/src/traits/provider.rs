// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the model inference service.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a chat-completion model with optional tool calling.
///
/// A call is a single blocking round trip from the caller's view. The
/// response carries free text, a tool call, or neither; interpreting the
/// last case is left to the caller.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemaError>;
}
