// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools the model may call instead of answering directly.
//!
//! The set of tools is closed: [`ToolName`] names every handler and the
//! [`ToolDispatcher`] binds each variant to one [`Tool`] at construction.
//! Dispatch never fails; every error becomes a failed [`ToolOutcome`]
//! that is shown to the model on the next round trip.
//!
//! [`ToolOutcome`]: mnema_core::ToolOutcome

pub mod builtin;
pub mod dispatcher;
pub mod schema;
pub mod tool;

pub use builtin::{AddUserInfoTool, SearchMemoryTool};
pub use dispatcher::{Dispatched, ToolDispatcher};
pub use tool::{Tool, ToolEffect, ToolName, ToolOutput};
