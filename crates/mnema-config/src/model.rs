// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnema conversation engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnema configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemaConfig {
    /// Agent identity and turn-loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model inference service settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// History window and summarization settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Relational store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vector memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Agent identity and turn-loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identifier stored alongside every history and summary row.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Maximum tool dispatches per turn before the answer is degraded.
    #[serde(default = "default_max_function_calls")]
    pub max_function_calls: u32,

    /// Seconds to wait for a single model call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional persona line prepended to the system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            user_id: default_user_id(),
            max_function_calls: default_max_function_calls(),
            request_timeout_secs: default_request_timeout_secs(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "mnema".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_max_function_calls() -> u32 {
    3
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Model inference service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` falls back to the `MISTRAL_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for conversation turns.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for compaction, summaries and search condensation.
    #[serde(default = "default_summary_model")]
    pub summary_model: String,

    /// Sampling temperature for chat turns.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries on HTTP 429/500/503 before the call fails.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            summary_model: default_summary_model(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_chat_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_summary_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_retries() -> u32 {
    1
}

/// History window and summarization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Pairs kept in the in-memory window; also the pair-count summary trigger.
    #[serde(default = "default_max_history_pairs")]
    pub max_history_pairs: usize,

    /// Token budget of the serialized window before compaction kicks in.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Character budget for search results before they are condensed.
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,

    /// Output token cap for summarization calls.
    #[serde(default = "default_compaction_max_tokens")]
    pub compaction_max_tokens: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_pairs: default_max_history_pairs(),
            max_tokens: default_max_tokens(),
            max_characters: default_max_characters(),
            compaction_max_tokens: default_compaction_max_tokens(),
        }
    }
}

fn default_max_history_pairs() -> usize {
    2
}

fn default_max_tokens() -> usize {
    2000
}

fn default_max_characters() -> usize {
    1000
}

fn default_compaction_max_tokens() -> u32 {
    300
}

/// Relational store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mnema").join("mnema.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mnema.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Vector memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Upsert finished pairs and offer the search tool.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Embedding backend: `mistral` (remote API) or `hashing` (offline).
    #[serde(default = "default_embedder")]
    pub embedder: String,

    /// Model name passed to the remote embeddings API.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Logical collection stored pairs are tagged with.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of matches returned by a search.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Minimum cosine similarity for a match to be returned.
    #[serde(default)]
    pub similarity_threshold: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            embedder: default_embedder(),
            embedding_model: default_embedding_model(),
            collection: default_collection(),
            k: default_k(),
            similarity_threshold: 0.0,
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_embedder() -> String {
    "mistral".to_string()
}

fn default_embedding_model() -> String {
    "mistral-embed".to_string()
}

fn default_collection() -> String {
    "chat_history".to_string()
}

fn default_k() -> usize {
    3
}
