// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Mistral API.
//!
//! Provides [`MistralClient`], which handles bearer authentication, JSON
//! request/response handling and retry of transient HTTP errors.

use std::time::Duration;

use mnema_core::MnemaError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse};

/// Base URL of the public Mistral API.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// HTTP client for Mistral API communication.
///
/// Transient errors (429, 500, 502, 503) are retried `max_retries` times
/// with a one second pause.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl MistralClient {
    /// Creates a new client authenticated with `api_key`.
    pub fn new(api_key: &str, base_url: &str, max_retries: u32) -> Result<Self, MnemaError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| MnemaError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| MnemaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the pause between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /chat/completions`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, MnemaError> {
        self.post_json("chat/completions", request).await
    }

    /// `POST /embeddings`.
    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, MnemaError> {
        self.post_json("embeddings", request).await
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, MnemaError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| MnemaError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, endpoint, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| MnemaError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| MnemaError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();
            let error = MnemaError::Provider {
                message: describe_error(status, &text),
                source: None,
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| MnemaError::Provider {
            message: "request failed after retries".into(),
            source: None,
        }))
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|e| e.describe())
    {
        Some(detail) => format!("Mistral API error ({status}): {detail}"),
        None => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> MistralClient {
        MistralClient::new("test-api-key", base_url, 1)
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "mistral-small-latest".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            tools: None,
            tool_choice: None,
            temperature: Some(0.3),
            max_tokens: None,
        }
    }

    fn text_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "cmpl-1",
            "model": "mistral-small-latest",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[tokio::test]
    async fn chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Hi there!")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).chat(&test_request()).await.unwrap();
        assert_eq!(result.id, "cmpl-1");
        assert_eq!(result.usage.unwrap().prompt_tokens, 10);
    }

    #[tokio::test]
    async fn chat_retries_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "message": "Requests rate limit exceeded", "type": "rate_limited"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("After retry")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).chat(&test_request()).await.unwrap();
        assert_eq!(result.choices.len(), 1);
    }

    #[tokio::test]
    async fn chat_fails_on_400_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "object": "error", "message": "Invalid model", "type": "invalid_request_error"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat(&test_request())
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn chat_exhausts_retries_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat(&test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat(&test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "got: {err}");
    }

    #[tokio::test]
    async fn sends_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("ok")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).chat(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = MistralClient::new("k", "http://localhost:1/v1/", 0).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/v1");
    }
}
