// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Mnema pipeline.
//!
//! Storage and vector memory are the real SQLite-backed implementations in a
//! temp directory; only the model is scripted. Tests are independent and
//! order-insensitive.

use std::sync::Arc;

use mnema_agent::{Agent, AgentDeps, TurnState};
use mnema_config::model::{MnemaConfig, StorageConfig};
use mnema_core::{MnemaError, Role, Session, StorageAdapter, ToolStatus};
use mnema_memory::{HashingEmbedder, MemoryStore, VectorMemory};
use mnema_skill::ToolName;
use mnema_storage::SqliteStorage;
use mnema_test_utils::{MockProvider, MockReply, TestHarness};
use serde_json::json;
use tempfile::TempDir;

/// An agent stack over one SQLite file, reusable across sessions.
struct Stack {
    _dir: TempDir,
    config: MnemaConfig,
    storage: Arc<SqliteStorage>,
    memory: Arc<VectorMemory>,
}

impl Stack {
    async fn new() -> Result<Self, MnemaError> {
        let dir = TempDir::new().map_err(MnemaError::storage)?;
        let mut config = MnemaConfig::default();
        config.storage = StorageConfig {
            database_path: dir.path().join("mnema.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        config.memory.embedder = "hashing".into();

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let store = MemoryStore::new(storage.database()?.clone());
        let memory = VectorMemory::new(Arc::new(HashingEmbedder::default()), store, &config.memory);

        Ok(Self {
            _dir: dir,
            config,
            storage: Arc::new(storage),
            memory: Arc::new(memory),
        })
    }

    async fn agent(&self, session: &str, provider: &MockProvider) -> Agent {
        let deps = AgentDeps {
            provider: Arc::new(provider.clone()),
            storage: self.storage.clone(),
            memory: self.memory.clone(),
        };
        Agent::with_session(&self.config, deps, Session::new(session, "local"))
            .await
            .unwrap()
    }
}

async fn send(agent: &mut Agent, message: &str) -> mnema_agent::TurnReport {
    let report = agent.turn(message).await;
    agent.flush_memory().await;
    report
}

// ---- Message pipeline ----

#[tokio::test]
async fn pipeline_returns_and_persists_the_answer() {
    let mut harness = TestHarness::builder()
        .with_sqlite()
        .with_replies(vec![MockReply::text("Hello from Mnema!")])
        .build()
        .await
        .unwrap();

    let report = harness.send("Hi there").await;
    assert_eq!(report.reply, "Hello from Mnema!");
    assert_eq!(report.state, TurnState::Answered);

    let pairs = harness.storage.recent_pairs("test-session", 10).await.unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].user, "Hi there");
    assert_eq!(pairs[0].assistant, "Hello from Mnema!");
}

#[tokio::test]
async fn window_is_embedded_in_later_prompts() {
    let stack = Stack::new().await.unwrap();
    let provider = MockProvider::with_replies(vec![
        MockReply::text("Nice to meet you."),
        MockReply::text("You just greeted me."),
    ]);
    let mut agent = stack.agent("s1", &provider).await;

    send(&mut agent, "Hello, I am new here").await;
    send(&mut agent, "What did I say?").await;

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    let system = &requests[1].messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("Hello, I am new here"));
    assert!(system.content.contains("Nice to meet you."));
    assert_eq!(requests[1].messages[1].content, "What did I say?");
}

// ---- Profile across sessions ----

#[tokio::test]
async fn profile_learned_in_one_session_reaches_the_next() {
    let stack = Stack::new().await.unwrap();

    let provider = MockProvider::with_replies(vec![
        MockReply::tool(
            ToolName::ADD_USER_INFO,
            json!({"updates": {"name": "Ada", "interests": ["chess"]}}),
        ),
        MockReply::text("Noted, Ada."),
    ]);
    let mut first = stack.agent("s1", &provider).await;
    let report = send(&mut first, "I'm Ada and I play chess").await;
    assert_eq!(report.tool_calls.len(), 1);
    assert_eq!(report.tool_calls[0].status, ToolStatus::Success);

    let provider = MockProvider::with_replies(vec![MockReply::text("Hi again, Ada.")]);
    let mut second = stack.agent("s2", &provider).await;
    assert_eq!(second.profile().name.as_deref(), Some("Ada"));

    send(&mut second, "Do you remember me?").await;
    let system = &provider.requests().await[0].messages[0].content;
    assert!(system.contains("Ada"));
    assert!(system.contains("chess"));
}

#[tokio::test]
async fn profile_interests_accumulate() {
    let stack = Stack::new().await.unwrap();
    let provider = MockProvider::with_replies(vec![
        MockReply::tool(ToolName::ADD_USER_INFO, json!({"interests": "chess, go"})),
        MockReply::text("ok"),
        MockReply::tool(ToolName::ADD_USER_INFO, json!({"interests": ["rust"]})),
        MockReply::text("ok"),
    ]);
    let mut agent = stack.agent("s1", &provider).await;

    send(&mut agent, "I like chess and go").await;
    send(&mut agent, "Also rust").await;

    let profile = stack.storage.get_profile().await.unwrap();
    let interests: Vec<_> = profile.interests.iter().map(String::as_str).collect();
    assert_eq!(interests, vec!["chess", "go", "rust"]);
}

// ---- Vector memory ----

#[tokio::test]
async fn search_finds_a_pair_from_an_earlier_session() {
    let stack = Stack::new().await.unwrap();

    let provider = MockProvider::with_replies(vec![MockReply::text("Rome is a lovely city.")]);
    let mut first = stack.agent("s1", &provider).await;
    send(&mut first, "My favourite city is Rome").await;

    let provider = MockProvider::with_replies(vec![
        MockReply::tool(ToolName::SEARCH_MEMORY, json!({"query": "favourite city Rome"})),
        MockReply::text("Your favourite city is Rome."),
    ]);
    let mut second = stack.agent("s2", &provider).await;
    let report = send(&mut second, "Which city do I like?").await;

    assert_eq!(report.state, TurnState::Answered);
    assert_eq!(report.tool_calls[0].status, ToolStatus::Success);
    let requests = provider.requests().await;
    let system = &requests[1].messages[0].content;
    assert!(system.contains("Tool call executed"));
    assert!(system.contains("My favourite city is Rome"));
}

// ---- Durable summaries ----

#[tokio::test]
async fn summary_is_written_and_shown_after_the_window_overflows() {
    let stack = Stack::new().await.unwrap();
    let provider = MockProvider::with_replies(vec![
        MockReply::text("A1"),
        MockReply::text("A2"),
        MockReply::text("A3"),
        MockReply::text("The user asked three questions."),
        MockReply::text("A4"),
    ]);
    let mut agent = stack.agent("s1", &provider).await;

    for q in ["Q1", "Q2", "Q3"] {
        send(&mut agent, q).await;
    }

    let summary = stack.storage.latest_summary("s1").await.unwrap().unwrap();
    assert_eq!(summary.text, "The user asked three questions.");

    send(&mut agent, "Q4").await;
    let requests = provider.requests().await;
    let summary_request = &requests[3];
    assert!(summary_request.tools.is_empty());
    assert!(summary_request.messages[0].content.contains("User: Q3"));
    assert!(!summary_request.messages[0].content.contains("User: Q1"));

    let last = requests.last().unwrap();
    assert!(last.messages[0].content.contains("The user asked three questions."));
    assert_eq!(stack.storage.count_pairs("s1").await.unwrap(), 4);
}

// ---- Failures ----

#[tokio::test]
async fn provider_failure_leaves_storage_untouched() {
    let stack = Stack::new().await.unwrap();
    let provider = MockProvider::with_replies(vec![MockReply::Error("upstream down".into())]);
    let mut agent = stack.agent("s1", &provider).await;

    let report = send(&mut agent, "hello?").await;
    assert_eq!(report.state, TurnState::Error);
    assert!(!report.persisted);
    assert_eq!(stack.storage.count_pairs("s1").await.unwrap(), 0);
    assert!(agent.window().is_empty());
}

#[tokio::test]
async fn sessions_are_listed_newest_first() {
    let stack = Stack::new().await.unwrap();
    for session in ["older", "newer"] {
        let provider = MockProvider::with_replies(vec![MockReply::text("ok")]);
        let mut agent = stack.agent(session, &provider).await;
        send(&mut agent, "ping").await;
    }

    let sessions = stack.storage.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, "newer");
    assert_eq!(sessions[1].pairs, 1);
}
