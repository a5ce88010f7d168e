// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with a scripted queue of
//! replies and records every request it receives, so tests can assert on
//! prompt contents and tool offerings without an external API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnema_core::types::{TokenUsage, ToolCallRequest};
use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ToolCall { name: String, arguments_json: String },
    /// Text and a tool call in the same reply.
    TextAndTool {
        text: String,
        name: String,
        arguments_json: String,
    },
    /// Sleeps this long before answering with a default text.
    Stall(Duration),
    /// Neither text nor a tool call.
    Empty,
    /// A transport failure with the given message.
    Error(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn tool(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        MockReply::ToolCall {
            name: name.into(),
            arguments_json: arguments.to_string(),
        }
    }

    pub fn text_with_tool(
        text: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        MockReply::TextAndTool {
            text: text.into(),
            name: name.into(),
            arguments_json: arguments.to_string(),
        }
    }

    /// A tool call whose arguments are passed through verbatim, valid JSON or not.
    pub fn raw_tool(name: impl Into<String>, arguments_json: impl Into<String>) -> Self {
        MockReply::ToolCall {
            name: name.into(),
            arguments_json: arguments_json.into(),
        }
    }
}

/// A mock provider that pops scripted replies in FIFO order.
///
/// When the queue is empty, a default "mock response" text is returned.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::default(),
        }
    }

    /// Convenience for a queue of plain text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::Text).collect())
    }

    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemaError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::text("mock response"));

        let usage = Some(TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        });
        match reply {
            MockReply::Text(text) => Ok(ProviderResponse {
                text: Some(text),
                tool_call: None,
                usage,
                model,
            }),
            MockReply::ToolCall {
                name,
                arguments_json,
            } => Ok(ProviderResponse {
                text: None,
                tool_call: Some(ToolCallRequest {
                    id: Some(format!("call-{name}")),
                    name,
                    arguments_json,
                }),
                usage,
                model,
            }),
            MockReply::TextAndTool {
                text,
                name,
                arguments_json,
            } => Ok(ProviderResponse {
                text: Some(text),
                tool_call: Some(ToolCallRequest {
                    id: Some(format!("call-{name}")),
                    name,
                    arguments_json,
                }),
                usage,
                model,
            }),
            MockReply::Stall(duration) => {
                tokio::time::sleep(duration).await;
                Ok(ProviderResponse {
                    text: Some("mock response".into()),
                    tool_call: None,
                    usage,
                    model,
                })
            }
            MockReply::Empty => Ok(ProviderResponse {
                model,
                ..Default::default()
            }),
            MockReply::Error(message) => Err(MnemaError::Provider {
                message,
                source: None,
            }),
        }
    }
}
