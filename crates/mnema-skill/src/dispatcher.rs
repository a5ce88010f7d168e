// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a model tool call to its handler and normalizes the result.

use std::sync::Arc;
use std::time::Duration;

use mnema_core::{MnemaError, ProfileField, ToolCallRequest, ToolDefinition, ToolOutcome};
use tracing::{debug, warn};

use crate::tool::{Tool, ToolEffect, ToolName};

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub name: ToolName,
    /// Parsed arguments, kept for rendering the outcome block. Empty when
    /// the arguments could not be parsed.
    pub arguments: serde_json::Map<String, serde_json::Value>,
    pub outcome: ToolOutcome,
    pub effect: Option<ToolEffect>,
    /// Set when the handler gave up on a model call after this long.
    pub timed_out: Option<Duration>,
}

/// Closed registry binding each [`ToolName`] to one handler.
pub struct ToolDispatcher {
    add_user_info: Arc<dyn Tool>,
    search_memory: Arc<dyn Tool>,
}

impl ToolDispatcher {
    pub fn new(add_user_info: Arc<dyn Tool>, search_memory: Arc<dyn Tool>) -> Self {
        Self {
            add_user_info,
            search_memory,
        }
    }

    fn handler(&self, name: &ToolName) -> Option<&Arc<dyn Tool>> {
        match name {
            ToolName::AddUserInfo => Some(&self.add_user_info),
            ToolName::SearchMemory => Some(&self.search_memory),
            ToolName::Unknown(_) => None,
        }
    }

    /// Definitions offered to the model, in a stable order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            self.add_user_info.definition(),
            self.search_memory.definition(),
        ]
    }

    /// Runs the requested tool. Never returns an error.
    pub async fn dispatch(&self, call: &ToolCallRequest) -> Dispatched {
        let name = ToolName::parse(&call.name);

        let arguments = match parse_arguments(&name, &call.arguments_json) {
            Ok(arguments) => arguments,
            Err(e) => return failed(name, serde_json::Map::new(), &e),
        };

        let Some(handler) = self.handler(&name) else {
            let err = MnemaError::UnknownTool(name.to_string());
            return failed(name, arguments, &err);
        };

        debug!(tool = %name, "dispatching tool call");
        match handler.invoke(arguments.clone()).await {
            Ok(output) => {
                debug!(tool = %name, "tool call succeeded");
                Dispatched {
                    name,
                    arguments,
                    outcome: ToolOutcome::success(output.detail),
                    effect: output.effect,
                    timed_out: None,
                }
            }
            Err(e) => failed(name, arguments, &e),
        }
    }
}

fn parse_arguments(
    name: &ToolName,
    raw: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, MnemaError> {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    let malformed = |detail: String| MnemaError::MalformedToolArguments {
        tool: name.to_string(),
        detail,
    };
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!("expected a JSON object, got {other}"))),
        Err(e) => Err(malformed(format!("invalid JSON arguments: {e}"))),
    }
}

fn failed(
    name: ToolName,
    arguments: serde_json::Map<String, serde_json::Value>,
    err: &MnemaError,
) -> Dispatched {
    warn!(tool = %name, error = %err, "tool call failed");
    Dispatched {
        name,
        arguments,
        outcome: ToolOutcome::failure(failure_detail(err)),
        effect: None,
        timed_out: match err {
            MnemaError::Timeout { duration } => Some(*duration),
            _ => None,
        },
    }
}

/// Text shown to the model for a failed call.
fn failure_detail(err: &MnemaError) -> String {
    match err {
        MnemaError::InvalidProfileKey { key } => format!(
            "'{key}' is not a profile field. Please provide a valid key from the following list: {}",
            ProfileField::accepted_keys()
        ),
        MnemaError::UnknownTool(name) => format!("Unknown function: {name}"),
        MnemaError::ToolFailed(message) | MnemaError::Internal(message) => message.clone(),
        other => other.to_string(),
    }
}
