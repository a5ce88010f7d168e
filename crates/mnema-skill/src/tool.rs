// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and the closed set of tool names.

use std::fmt;

use async_trait::async_trait;
use mnema_core::{MnemaError, Profile, ToolDefinition};

/// Every tool the engine knows, plus a catch-all for anything else the
/// model asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolName {
    AddUserInfo,
    SearchMemory,
    Unknown(String),
}

impl ToolName {
    pub const ADD_USER_INFO: &'static str = "add_user_info_to_database";
    pub const SEARCH_MEMORY: &'static str = "search_vector_db";

    pub fn parse(name: &str) -> Self {
        match name {
            Self::ADD_USER_INFO => ToolName::AddUserInfo,
            Self::SEARCH_MEMORY => ToolName::SearchMemory,
            other => ToolName::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ToolName::AddUserInfo => Self::ADD_USER_INFO,
            ToolName::SearchMemory => Self::SEARCH_MEMORY,
            ToolName::Unknown(name) => name,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State change a successful tool wants the orchestrator to pick up.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// The profile row changed; carries the merged profile.
    ProfileChanged(Profile),
}

/// Successful tool result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub detail: String,
    pub effect: Option<ToolEffect>,
}

impl ToolOutput {
    pub fn text(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            effect: None,
        }
    }
}

/// A handler the model can invoke by name.
///
/// `invoke` receives the parsed argument object. Errors are converted to
/// a failed outcome by the dispatcher.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    fn description(&self) -> &str;

    /// JSON Schema of the argument object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn invoke(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutput, MnemaError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
