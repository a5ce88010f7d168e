// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnema conversation engine.

use thiserror::Error;

/// The primary error type used across all Mnema adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MnemaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Relational or vector store errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model inference errors (API failure, HTTP status, undecodable body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Tool arguments were not valid JSON or did not match the tool's schema.
    #[error("malformed arguments for tool '{tool}': {detail}")]
    MalformedToolArguments { tool: String, detail: String },

    /// The model asked for a tool that is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A profile update named a field outside the profile schema.
    #[error("invalid profile key '{key}'")]
    InvalidProfileKey { key: String },

    /// The summarizer returned output that could not be parsed into turn pairs.
    #[error("compaction output could not be parsed: {0}")]
    CompactionParse(String),

    /// The model returned neither text nor a tool call.
    #[error("model returned neither text nor a tool call")]
    TurnProtocolViolation,

    /// A tool ran but could not produce a result; the text is shown to the model.
    #[error("{0}")]
    ToolFailed(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemaError {
    /// Wraps any storage backend error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MnemaError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for failures of an external round trip (model or store).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MnemaError::Storage { .. } | MnemaError::Provider { .. } | MnemaError::Timeout { .. }
        )
    }
}
