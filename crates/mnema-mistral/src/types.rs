// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Mistral chat-completions and embeddings endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ApiToolCall>>,
}

/// Message content is either a plain string or a list of typed chunks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseContent {
    Text(String),
    Chunks(Vec<ContentChunk>),
}

impl ResponseContent {
    pub fn into_text(self) -> String {
        match self {
            ResponseContent::Text(s) => s,
            ResponseContent::Chunks(chunks) => chunks
                .into_iter()
                .filter_map(|c| c.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentChunk {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub function: ApiFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFunctionCall {
    pub name: String,
    /// Usually a JSON string; some models emit an object instead.
    pub arguments: serde_json::Value,
}

impl ApiFunctionCall {
    pub fn arguments_json(&self) -> String {
        match &self.arguments {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Body of `POST /embeddings`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

/// Error body. Mistral uses `{message, type}` for most errors and
/// `{detail}` for some authentication failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn describe(&self) -> Option<String> {
        match (&self.type_, &self.message, &self.detail) {
            (Some(t), Some(m), _) => Some(format!("{t}: {m}")),
            (None, Some(m), _) => Some(m.clone()),
            (_, None, Some(d)) => Some(d.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_response_parses() {
        let body = serde_json::json!({
            "id": "c1",
            "model": "mistral-small-latest",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "search_vector_db", "arguments": "{\"query\":\"tea\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        });
        let parsed: ChatResponse = serde_json::from_value(body).unwrap();
        let call = &parsed.choices[0].message.tool_calls.as_ref().unwrap()[0];
        assert_eq!(call.function.name, "search_vector_db");
        assert_eq!(call.function.arguments_json(), "{\"query\":\"tea\"}");
    }

    #[test]
    fn object_arguments_are_reserialized() {
        let call: ApiFunctionCall = serde_json::from_value(serde_json::json!({
            "name": "add_user_info_to_database",
            "arguments": {"location": "Italy"}
        }))
        .unwrap();
        assert_eq!(call.arguments_json(), "{\"location\":\"Italy\"}");
    }

    #[test]
    fn chunked_content_is_joined() {
        let content: ResponseContent = serde_json::from_value(serde_json::json!([
            {"type": "text", "text": "Hello "},
            {"type": "text", "text": "world"}
        ]))
        .unwrap();
        assert_eq!(content.into_text(), "Hello world");
    }

    #[test]
    fn error_body_variants() {
        let typed: ApiErrorResponse = serde_json::from_value(serde_json::json!({
            "object": "error", "message": "bad model", "type": "invalid_request_error"
        }))
        .unwrap();
        assert_eq!(typed.describe().unwrap(), "invalid_request_error: bad model");

        let detail: ApiErrorResponse =
            serde_json::from_value(serde_json::json!({"detail": "Unauthorized"})).unwrap();
        assert_eq!(detail.describe().unwrap(), "\"Unauthorized\"");
    }
}
