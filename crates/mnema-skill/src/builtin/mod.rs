// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools: profile updates and long-term memory search.

pub mod profile;
pub mod search;

pub use profile::AddUserInfoTool;
pub use search::SearchMemoryTool;
