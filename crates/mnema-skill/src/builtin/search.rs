// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `search_vector_db`: semantic search over past conversations.
//!
//! Results longer than `max_characters` are condensed by the summary model
//! before they reach the prompt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mnema_config::model::{HistoryConfig, MemoryConfig, ProviderConfig};
use mnema_core::{
    ChatMessage, MnemaError, ProviderAdapter, ProviderRequest, VectorMemoryAdapter,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::schema::parameters_schema;
use crate::tool::{Tool, ToolName, ToolOutput};

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchArgs {
    /// What to look for in earlier conversations with the user.
    query: String,
}

pub struct SearchMemoryTool {
    memory: Arc<dyn VectorMemoryAdapter>,
    provider: Arc<dyn ProviderAdapter>,
    summary_model: String,
    k: usize,
    max_characters: usize,
    call_timeout: Duration,
}

impl SearchMemoryTool {
    pub fn new(
        memory: Arc<dyn VectorMemoryAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        provider_config: &ProviderConfig,
        memory_config: &MemoryConfig,
        history: &HistoryConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            memory,
            provider,
            summary_model: provider_config.summary_model.clone(),
            k: memory_config.k,
            max_characters: history.max_characters,
            call_timeout,
        }
    }

    async fn condense(&self, query: &str, results: &str) -> Result<String, MnemaError> {
        let request = ProviderRequest::new(
            &self.summary_model,
            vec![
                ChatMessage::system(format!(
                    "Summarize the following search results for the query \"{query}\" \
                     within {} characters. Keep names, dates and facts.",
                    self.max_characters
                )),
                ChatMessage::user(results),
            ],
        );
        let response = tokio::time::timeout(self.call_timeout, self.provider.complete(request))
            .await
            .map_err(|_| MnemaError::Timeout {
                duration: self.call_timeout,
            })??;
        response
            .non_empty_text()
            .map(str::to_string)
            .ok_or_else(|| MnemaError::Provider {
                message: "summary model returned no text for search results".into(),
                source: None,
            })
    }
}

#[async_trait]
impl Tool for SearchMemoryTool {
    fn name(&self) -> ToolName {
        ToolName::SearchMemory
    }

    fn description(&self) -> &str {
        "Search the long-term memory of earlier conversations with the user and return the \
         most relevant exchanges."
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema::<SearchArgs>()
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<ToolOutput, MnemaError> {
        let args: SearchArgs = serde_json::from_value(Value::Object(arguments)).map_err(|e| {
            MnemaError::MalformedToolArguments {
                tool: ToolName::SEARCH_MEMORY.into(),
                detail: e.to_string(),
            }
        })?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(MnemaError::MalformedToolArguments {
                tool: ToolName::SEARCH_MEMORY.into(),
                detail: "query must not be empty".into(),
            });
        }

        let hits = self.memory.search(query, self.k).await?;
        if hits.is_empty() {
            return Err(MnemaError::ToolFailed(
                "No result found. Please try again with different words.".into(),
            ));
        }

        let joined = hits.join("\n\n");
        let characters = joined.chars().count();
        debug!(hits = hits.len(), characters, "memory search results");
        if characters <= self.max_characters {
            return Ok(ToolOutput::text(joined));
        }

        let condensed = self.condense(query, &joined).await?;
        info!(
            characters,
            condensed = condensed.chars().count(),
            "search results condensed"
        );
        Ok(ToolOutput::text(condensed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_test_utils::{MockProvider, MockReply, MockVectorMemory};
    use mnema_core::{AdapterType, HealthStatus, PluginAdapter, ProviderResponse};
    use serde_json::json;

    /// Never answers within any reasonable timeout.
    struct StalledProvider;

    #[async_trait]
    impl PluginAdapter for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
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
    impl ProviderAdapter for StalledProvider {
        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, MnemaError> {
            tokio::time::sleep(Duration::from_secs(1_000_000)).await;
            Ok(ProviderResponse::default())
        }
    }

    fn tool(memory: MockVectorMemory, provider: MockProvider, max_characters: usize) -> SearchMemoryTool {
        let history = HistoryConfig {
            max_characters,
            ..HistoryConfig::default()
        };
        SearchMemoryTool::new(
            Arc::new(memory),
            Arc::new(provider),
            &ProviderConfig::default(),
            &MemoryConfig::default(),
            &history,
            Duration::from_secs(60),
        )
    }

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn short_results_are_returned_verbatim() {
        let memory = MockVectorMemory::with_entries(vec!["User: I love Rome\nAssistant: Nice".into()]);
        let provider = MockProvider::new();
        let out = tool(memory, provider.clone(), 1000)
            .invoke(args(json!({"query": "Rome"})))
            .await
            .unwrap();
        assert!(out.detail.contains("I love Rome"));
        assert_eq!(provider.request_count().await, 0);
    }

    #[tokio::test]
    async fn long_results_are_condensed() {
        let memory = MockVectorMemory::with_entries(vec!["Rome ".repeat(100)]);
        let provider = MockProvider::with_replies(vec![MockReply::text("User likes Rome.")]);
        let out = tool(memory, provider.clone(), 50)
            .invoke(args(json!({"query": "Rome"})))
            .await
            .unwrap();
        assert_eq!(out.detail, "User likes Rome.");

        let request = &provider.requests().await[0];
        assert!(request.tools.is_empty());
        assert!(request.messages[0].content.contains("within 50 characters"));
    }

    #[tokio::test(start_paused = true)]
    async fn condensing_is_bounded_by_the_call_timeout() {
        let memory = MockVectorMemory::with_entries(vec!["Rome ".repeat(100)]);
        let search = SearchMemoryTool::new(
            Arc::new(memory),
            Arc::new(StalledProvider),
            &ProviderConfig::default(),
            &MemoryConfig::default(),
            &HistoryConfig {
                max_characters: 10,
                ..HistoryConfig::default()
            },
            Duration::from_secs(5),
        );

        let started = tokio::time::Instant::now();
        let err = search.invoke(args(json!({"query": "Rome"}))).await.unwrap_err();
        assert!(matches!(err, MnemaError::Timeout { .. }), "got {err:?}");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn no_hits_is_a_failure() {
        let err = tool(MockVectorMemory::new(), MockProvider::new(), 1000)
            .invoke(args(json!({"query": "anything"})))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemaError::ToolFailed(_)));
        assert_eq!(err.to_string(), "No result found. Please try again with different words.");
    }

    #[tokio::test]
    async fn missing_query_is_malformed() {
        let err = tool(MockVectorMemory::new(), MockProvider::new(), 1000)
            .invoke(args(json!({"q": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemaError::MalformedToolArguments { .. }));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let memory = MockVectorMemory::new();
        memory.fail(true);
        let err = tool(memory, MockProvider::new(), 1000)
            .invoke(args(json!({"query": "x"})))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
