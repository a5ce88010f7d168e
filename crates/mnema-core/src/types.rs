// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Mnema engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier for a conversation session, unique per process run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversational state of one session. Only its turns and summaries are
/// persisted, never the session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: String,
    /// Pairs persisted since the last durable summary.
    pub pairs_since_last_summary: u32,
}

impl Session {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: SessionId(session_id.into()),
            user_id: user_id.into(),
            pairs_since_last_summary: 0,
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Embedding,
    VectorMemory,
}

/// Speaker of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the history window. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A user message together with the assistant's reply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPair {
    pub user: String,
    pub assistant: String,
}

impl TurnPair {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }

    /// Splits the pair into its two window entries, user first.
    pub fn into_turns(self) -> [Turn; 2] {
        [Turn::user(self.user), Turn::assistant(self.assistant)]
    }

    /// Plain-text rendering used for embeddings and summaries.
    pub fn render(&self) -> String {
        format!("User: {}\nAssistant: {}", self.user, self.assistant)
    }
}

/// A durable summary row. Only the latest one per session is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: i64,
    pub session_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: String,
}

// --- Provider types ---

/// A single chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Description of a callable tool offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments object.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Function-calling envelope used by chat-completions style APIs.
    pub fn to_function_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// How the model may pick tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
    Any,
}

/// A request to the model inference service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Empty means the call carries no tool schema.
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tool_choice = if tools.is_empty() {
            None
        } else {
            Some(ToolChoice::Auto)
        };
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A tool invocation requested by the model. Consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: Option<String>,
    pub name: String,
    /// Raw JSON text of the arguments, exactly as the model produced it.
    pub arguments_json: String,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The model's reply: free text, a tool call, or (protocol violation) neither.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderResponse {
    pub text: Option<String>,
    pub tool_call: Option<ToolCallRequest>,
    pub usage: Option<TokenUsage>,
    pub model: String,
}

impl ProviderResponse {
    /// Returns the reply text when it contains anything besides whitespace.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

// --- Tool outcome ---

/// Whether a tool handler succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Failure,
}

/// Normalized result of one dispatch. Fed into the next prompt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub status: ToolStatus,
    pub detail: String,
}

impl ToolOutcome {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            detail: detail.into(),
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Failure,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

// --- Embedding types ---

/// Input for embedding generation.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from embedding generation, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn pair_splits_user_first() {
        let [u, a] = TurnPair::new("hi", "hello").into_turns();
        assert_eq!(u, Turn::user("hi"));
        assert_eq!(a, Turn::assistant("hello"));
    }

    #[test]
    fn with_tools_sets_auto_choice() {
        let def = ToolDefinition {
            name: "t".into(),
            description: "d".into(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let req = ProviderRequest::new("m", vec![]).with_tools(vec![def]);
        assert_eq!(req.tool_choice, Some(ToolChoice::Auto));

        let req = ProviderRequest::new("m", vec![]).with_tools(vec![]);
        assert_eq!(req.tool_choice, None);
    }

    #[test]
    fn function_envelope_shape() {
        let def = ToolDefinition {
            name: "search_vector_db".into(),
            description: "Search memory".into(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let v = def.to_function_json();
        assert_eq!(v["type"], "function");
        assert_eq!(v["function"]["name"], "search_vector_db");
    }

    #[test]
    fn whitespace_text_is_empty() {
        let resp = ProviderResponse {
            text: Some("  \n".into()),
            ..Default::default()
        };
        assert!(resp.non_empty_text().is_none());
    }

    #[test]
    fn outcome_constructors() {
        assert!(ToolOutcome::success("ok").is_success());
        assert!(!ToolOutcome::failure("bad").is_success());
        assert_eq!(ToolStatus::Failure.to_string(), "failure");
    }
}
