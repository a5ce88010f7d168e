// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mistral provider adapters for the Mnema conversation engine.
//!
//! [`MistralProvider`] implements [`ProviderAdapter`] over the
//! chat-completions endpoint with function calling, and
//! [`MistralEmbedder`] implements [`EmbeddingAdapter`] over `/embeddings`.

pub mod client;
pub mod embeddings;
pub mod types;

use async_trait::async_trait;
use mnema_config::model::ProviderConfig;
use mnema_core::types::{TokenUsage, ToolCallRequest};
use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};
use tracing::{debug, info};

pub use client::MistralClient;
pub use embeddings::MistralEmbedder;

use crate::types::{ApiMessage, ChatRequest, ChatResponse};

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Mistral chat model implementing [`ProviderAdapter`].
pub struct MistralProvider {
    client: MistralClient,
}

impl MistralProvider {
    /// Creates a provider from configuration.
    ///
    /// The API key comes from `provider.api_key`, then `MISTRAL_API_KEY`.
    pub fn new(config: &ProviderConfig) -> Result<Self, MnemaError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = MistralClient::new(&api_key, &config.base_url, config.max_retries)?;
        info!(model = %config.chat_model, base_url = %config.base_url, "Mistral provider initialized");
        Ok(Self { client })
    }

    /// Creates a provider with an existing client.
    pub fn with_client(client: MistralClient) -> Self {
        Self { client }
    }

    /// The underlying HTTP client, shared with [`MistralEmbedder`].
    pub fn client(&self) -> &MistralClient {
        &self.client
    }
}

/// Resolves the API key from config or environment.
pub fn resolve_api_key(configured: Option<&str>) -> Result<String, MnemaError> {
    if let Some(key) = configured.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(MnemaError::Config(format!(
            "no Mistral API key: set provider.api_key or {API_KEY_ENV}"
        ))),
    }
}

/// Converts a core request into the chat-completions body.
pub fn to_chat_request(request: &ProviderRequest) -> ChatRequest {
    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .iter()
                .map(|t| t.to_function_json())
                .collect(),
        )
    };

    ChatRequest {
        model: request.model.clone(),
        messages: request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
        tool_choice: tools
            .as_ref()
            .and(request.tool_choice)
            .map(|c| c.to_string()),
        tools,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

/// Converts the first choice into a core response.
///
/// Only the first tool call is kept; the engine handles one tool call per
/// model round trip.
pub fn from_chat_response(response: ChatResponse) -> Result<ProviderResponse, MnemaError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| MnemaError::Provider {
            message: "response contained no choices".into(),
            source: None,
        })?;

    let mut calls = choice.message.tool_calls.unwrap_or_default();
    if calls.len() > 1 {
        debug!(count = calls.len(), "multiple tool calls returned, using the first");
    }
    let tool_call = (!calls.is_empty()).then(|| {
        let call = calls.swap_remove(0);
        ToolCallRequest {
            arguments_json: call.function.arguments_json(),
            id: call.id,
            name: call.function.name,
        }
    });

    let text = choice
        .message
        .content
        .map(|c| c.into_text())
        .filter(|t| !t.is_empty());

    Ok(ProviderResponse {
        text,
        tool_call,
        usage: response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
        model: response.model,
    })
}

#[async_trait]
impl PluginAdapter for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
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
impl ProviderAdapter for MistralProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemaError> {
        let body = to_chat_request(&request);
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            "sending completion request"
        );
        let response = self.client.chat(&body).await?;
        from_chat_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::{ChatMessage, ToolDefinition};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> MistralProvider {
        let client = MistralClient::new("k", &server.uri(), 0)
            .unwrap()
            .with_retry_delay(Duration::from_millis(1));
        MistralProvider::with_client(client)
    }

    fn search_tool() -> ToolDefinition {
        ToolDefinition {
            name: "search_vector_db".into(),
            description: "Search long-term memory".into(),
            parameters: serde_json::json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let req = ProviderRequest::new("m", vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(to_chat_request(&req)).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn request_with_tools_sets_auto() {
        let req = ProviderRequest::new("m", vec![ChatMessage::system("s")])
            .with_tools(vec![search_tool()]);
        let json = serde_json::to_value(to_chat_request(&req)).unwrap();
        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["tools"][0]["function"]["name"], "search_vector_db");
    }

    #[test]
    fn explicit_key_wins_over_env() {
        assert_eq!(resolve_api_key(Some("cfg")).unwrap(), "cfg");
    }

    #[tokio::test]
    async fn complete_returns_tool_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "c", "model": "mistral-small-latest",
                "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": [
                    {"id": "t1", "type": "function", "function": {"name": "search_vector_db", "arguments": "{\"query\":\"rust\"}"}}
                ]}, "finish_reason": "tool_calls"}]
            })))
            .mount(&server)
            .await;

        let req = ProviderRequest::new("mistral-small-latest", vec![ChatMessage::user("q")])
            .with_tools(vec![search_tool()]);
        let resp = provider(&server).complete(req).await.unwrap();
        assert!(resp.text.is_none());
        let call = resp.tool_call.unwrap();
        assert_eq!(call.name, "search_vector_db");
        assert_eq!(call.id.as_deref(), Some("t1"));
        assert_eq!(call.arguments_json, "{\"query\":\"rust\"}");
    }

    #[tokio::test]
    async fn complete_returns_text_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "c", "model": "mistral-small-latest",
                "choices": [{"message": {"role": "assistant", "content": "Ciao!"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 7, "completion_tokens": 2}
            })))
            .mount(&server)
            .await;

        let resp = provider(&server)
            .complete(ProviderRequest::new("m", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();
        assert_eq!(resp.text.as_deref(), Some("Ciao!"));
        assert_eq!(resp.usage.unwrap().output_tokens, 2);
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(ProviderRequest::new("m", vec![]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
