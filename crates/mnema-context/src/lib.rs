// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history for the Mnema engine.
//!
//! The history of a session lives in two places:
//!
//! - **Window**: a bounded in-memory list of the most recent turns, sent
//!   verbatim with every prompt ([`HistoryWindow`]).
//! - **Durable log**: every completed pair plus periodic summaries, kept in
//!   the relational store ([`HistoryBuffer`] writes through to it).
//!
//! [`SummarizationPolicy`] runs after each append and applies the two
//! independent triggers: token-budget compaction of the window and
//! pair-count durable summaries.

pub mod buffer;
pub mod compaction;
pub mod policy;
pub mod summary;
pub mod tokens;
pub mod window;

pub use buffer::HistoryBuffer;
pub use policy::{CompactionOutcome, PolicyReport, SummarizationPolicy, SummaryOutcome};
pub use tokens::count_tokens;
pub use window::HistoryWindow;
