// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn state machine states.

use mnema_core::ToolStatus;
use mnema_skill::ToolName;

/// States of one user turn.
///
/// `Thinking` → `DirectAnswer` | `ToolRequested` → (back to `Thinking`) →
/// `Answered` | `DegradedAnswer`. `Error` is terminal as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Building the prompt and waiting for the model.
    Thinking,
    /// The model answered with text.
    DirectAnswer,
    /// The model asked for a tool.
    ToolRequested,
    /// Terminal: the direct answer was delivered.
    Answered,
    /// Terminal: the tool-call bound was hit and the answer was forced without tools.
    DegradedAnswer,
    /// Terminal: transport failure, timeout or malformed model turn.
    Error,
}

impl TurnState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TurnState::Answered | TurnState::DegradedAnswer | TurnState::Error
        )
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Thinking => write!(f, "thinking"),
            TurnState::DirectAnswer => write!(f, "direct_answer"),
            TurnState::ToolRequested => write!(f, "tool_requested"),
            TurnState::Answered => write!(f, "answered"),
            TurnState::DegradedAnswer => write!(f, "degraded_answer"),
            TurnState::Error => write!(f, "error"),
        }
    }
}

/// One dispatch made during a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRecord {
    pub name: ToolName,
    pub status: ToolStatus,
}

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Text shown to the user. Always present, an apology on failure.
    pub reply: String,
    pub state: TurnState,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Whether the pair reached durable storage.
    pub persisted: bool,
}
