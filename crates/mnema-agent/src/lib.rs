// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn loop for the Mnema conversation engine.
//!
//! The [`Agent`] owns one session and runs one user turn at a time:
//! - Builds the system prompt from profile, latest summary and window
//! - Calls the model with the tool schema and dispatches tool calls
//! - Degrades to a tool-less final call once `max_function_calls` is hit
//! - Appends the finished pair and runs the summarization policy
//! - Defers the vector memory upsert past the returned answer

pub mod prompt;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use mnema_config::model::MnemaConfig;
use mnema_context::{
    CompactionOutcome, HistoryBuffer, HistoryWindow, SummarizationPolicy, SummaryOutcome,
};
use mnema_core::{
    ChatMessage, MnemaError, Profile, ProviderAdapter, ProviderRequest, ProviderResponse, Session,
    StorageAdapter, ToolDefinition, TurnPair, VectorMemoryAdapter,
};
use mnema_skill::{AddUserInfoTool, SearchMemoryTool, ToolDispatcher, ToolEffect};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::prompt::{LIMIT_NOTICE, PromptParts, build_system_prompt, outcome_block};
pub use crate::state::{ToolCallRecord, TurnReport, TurnState};

/// Reply for transport failures and timeouts.
pub const ERROR_APOLOGY: &str =
    "I apologize, but an error occurred while processing your request. Please try again.";

/// Reply when the model produced neither text nor a tool call.
pub const EMPTY_TURN_APOLOGY: &str =
    "I apologize, but I didn't generate a proper response. Please try rephrasing your question.";

/// External collaborators of an [`Agent`].
#[derive(Clone)]
pub struct AgentDeps {
    pub provider: Arc<dyn ProviderAdapter>,
    pub storage: Arc<dyn StorageAdapter>,
    pub memory: Arc<dyn VectorMemoryAdapter>,
}

/// Orchestrates the turns of one session.
///
/// `turn` takes `&mut self`, so turns of a session are serialized by
/// construction. Independent sessions use independent agents.
pub struct Agent {
    provider: Arc<dyn ProviderAdapter>,
    storage: Arc<dyn StorageAdapter>,
    memory: Arc<dyn VectorMemoryAdapter>,
    dispatcher: ToolDispatcher,
    policy: SummarizationPolicy,
    buffer: HistoryBuffer,
    profile: Profile,
    chat_model: String,
    temperature: f32,
    max_function_calls: u32,
    call_timeout: Duration,
    persona: Option<String>,
    background: TaskTracker,
}

/// Creates a fresh session with a random id for `user_id`.
pub fn new_session(user_id: &str) -> Session {
    Session::new(uuid::Uuid::new_v4().to_string(), user_id)
}

impl Agent {
    /// Builds an agent for a new session and loads the cached profile.
    pub async fn new(config: &MnemaConfig, deps: AgentDeps) -> Result<Self, MnemaError> {
        Self::with_session(config, deps, new_session(&config.agent.user_id)).await
    }

    pub async fn with_session(
        config: &MnemaConfig,
        deps: AgentDeps,
        session: Session,
    ) -> Result<Self, MnemaError> {
        let call_timeout = Duration::from_secs(config.agent.request_timeout_secs);

        let dispatcher = ToolDispatcher::new(
            Arc::new(AddUserInfoTool::new(deps.storage.clone())),
            Arc::new(SearchMemoryTool::new(
                deps.memory.clone(),
                deps.provider.clone(),
                &config.provider,
                &config.memory,
                &config.history,
                call_timeout,
            )),
        );
        let policy = SummarizationPolicy::new(
            deps.provider.clone(),
            &config.history,
            &config.provider,
            call_timeout,
        );
        let profile = deps.storage.get_profile().await?;

        info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            model = %config.provider.chat_model,
            "session started"
        );

        Ok(Self {
            buffer: HistoryBuffer::new(
                deps.storage.clone(),
                session,
                config.history.max_history_pairs,
            ),
            provider: deps.provider,
            storage: deps.storage,
            memory: deps.memory,
            dispatcher,
            policy,
            profile,
            chat_model: config.provider.chat_model.clone(),
            temperature: config.provider.temperature,
            max_function_calls: config.agent.max_function_calls,
            call_timeout,
            persona: config.agent.system_prompt.clone(),
            background: TaskTracker::new(),
        })
    }

    pub fn session(&self) -> &Session {
        self.buffer.session()
    }

    pub fn window(&self) -> &HistoryWindow {
        self.buffer.window()
    }

    /// The cached profile used for prompt assembly.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.dispatcher.definitions()
    }

    /// Re-reads the profile row into the cache.
    pub async fn refresh_profile(&mut self) -> Result<(), MnemaError> {
        self.profile = self.storage.get_profile().await?;
        Ok(())
    }

    /// Latest durable summary of this session.
    pub async fn latest_summary(&self) -> Result<Option<String>, MnemaError> {
        self.buffer.latest_summary().await
    }

    /// Runs one user turn. Never fails; failures produce an apology with
    /// state [`TurnState::Error`] and leave the history untouched.
    pub async fn turn(&mut self, user_message: &str) -> TurnReport {
        let mut tool_calls = Vec::new();
        match self.run_turn(user_message, &mut tool_calls).await {
            Ok(report) => report,
            Err(e) => {
                let reply = match &e {
                    MnemaError::TurnProtocolViolation => EMPTY_TURN_APOLOGY,
                    _ => ERROR_APOLOGY,
                };
                error!(
                    session_id = %self.session().session_id,
                    error = %e,
                    tool_calls = tool_calls.len(),
                    "turn failed"
                );
                TurnReport {
                    reply: reply.to_string(),
                    state: TurnState::Error,
                    tool_calls,
                    persisted: false,
                }
            }
        }
    }

    async fn run_turn(
        &mut self,
        user_message: &str,
        tool_calls: &mut Vec<ToolCallRecord>,
    ) -> Result<TurnReport, MnemaError> {
        let summary = self.buffer.latest_summary().await?;
        let tools = self.dispatcher.definitions();
        let mut outcome_section = String::new();
        let mut dispatches: u32 = 0;

        while dispatches < self.max_function_calls {
            self.enter(TurnState::Thinking);
            let system = self.system_prompt(summary.as_deref(), &outcome_section);
            let request = self
                .request(system, user_message)
                .with_tools(tools.clone());
            let response = self.call_model(request).await?;

            if let Some(text) = response.non_empty_text() {
                self.enter(TurnState::DirectAnswer);
                let text = text.to_string();
                return Ok(self
                    .finish(user_message, text, TurnState::Answered, tool_calls)
                    .await);
            }

            let Some(call) = response.tool_call else {
                return Err(MnemaError::TurnProtocolViolation);
            };
            self.enter(TurnState::ToolRequested);
            if dispatches >= self.max_function_calls {
                break;
            }

            dispatches += 1;
            let dispatched = self.dispatcher.dispatch(&call).await;
            debug!(
                tool = %dispatched.name,
                status = %dispatched.outcome.status,
                dispatches,
                "tool dispatched"
            );
            if let Some(ToolEffect::ProfileChanged(profile)) = &dispatched.effect {
                self.profile = profile.clone();
            }
            tool_calls.push(ToolCallRecord {
                name: dispatched.name.clone(),
                status: dispatched.outcome.status,
            });
            if let Some(duration) = dispatched.timed_out {
                return Err(MnemaError::Timeout { duration });
            }
            outcome_section = outcome_block(&dispatched);
        }

        warn!(
            session_id = %self.session().session_id,
            max_function_calls = self.max_function_calls,
            "tool call limit reached, forcing a final answer"
        );
        self.enter(TurnState::Thinking);
        let section = if outcome_section.is_empty() {
            LIMIT_NOTICE.to_string()
        } else {
            format!("{outcome_section}\n\n{LIMIT_NOTICE}")
        };
        let system = self.system_prompt(summary.as_deref(), &section);
        let response = self.call_model(self.request(system, user_message)).await?;
        let text = response
            .non_empty_text()
            .ok_or(MnemaError::TurnProtocolViolation)?
            .to_string();
        Ok(self
            .finish(user_message, text, TurnState::DegradedAnswer, tool_calls)
            .await)
    }

    fn enter(&self, state: TurnState) {
        debug!(session_id = %self.session().session_id, state = %state, "turn state");
    }

    fn system_prompt(&self, summary: Option<&str>, outcome_section: &str) -> String {
        let history = self.buffer.window().serialize();
        build_system_prompt(&PromptParts {
            persona: self.persona.as_deref(),
            profile: &self.profile,
            summary,
            history: &history,
            outcome_section,
        })
    }

    fn request(&self, system: String, user_message: &str) -> ProviderRequest {
        ProviderRequest::new(
            &self.chat_model,
            vec![ChatMessage::system(system), ChatMessage::user(user_message)],
        )
        .with_temperature(self.temperature)
    }

    async fn call_model(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemaError> {
        match tokio::time::timeout(self.call_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(MnemaError::Timeout {
                duration: self.call_timeout,
            }),
        }
    }

    /// Records a finalized answer: history, summarization, deferred upsert.
    async fn finish(
        &mut self,
        user_message: &str,
        reply: String,
        state: TurnState,
        tool_calls: &mut Vec<ToolCallRecord>,
    ) -> TurnReport {
        let persisted = match self.buffer.append(user_message, reply.clone()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "answer delivered without durable history");
                false
            }
        };

        let report = self.policy.after_append(&mut self.buffer).await;
        match report.compaction {
            CompactionOutcome::Compacted { tokens_after, .. } => {
                debug!(tokens_after, "window compacted after turn");
            }
            CompactionOutcome::Failed(e) => debug!(error = %e, "compaction skipped after failure"),
            CompactionOutcome::Skipped => {}
        }
        if let SummaryOutcome::Summarized { summary_id } = report.summary {
            debug!(summary_id, "durable summary written after turn");
        }

        self.schedule_upsert(TurnPair::new(user_message, reply.clone()));

        info!(
            session_id = %self.session().session_id,
            state = %state,
            tool_calls = tool_calls.len(),
            persisted,
            "turn complete"
        );
        TurnReport {
            reply,
            state,
            tool_calls: std::mem::take(tool_calls),
            persisted,
        }
    }

    fn schedule_upsert(&self, pair: TurnPair) {
        let memory = self.memory.clone();
        self.background.spawn(async move {
            if let Err(e) = memory.upsert(&pair).await {
                warn!(error = %e, "vector memory upsert failed");
            }
        });
    }

    /// Waits for deferred memory upserts to finish.
    pub async fn flush_memory(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// Flushes pending upserts and closes the storage backend.
    pub async fn shutdown(&self) -> Result<(), MnemaError> {
        self.flush_memory().await;
        self.storage.close().await
    }
}
