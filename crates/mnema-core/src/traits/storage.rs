// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relational store.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::profile::{Profile, ProfileUpdate};
use crate::traits::adapter::PluginAdapter;
use crate::types::{SummaryRecord, TurnPair};

/// Adapter for the durable relational store.
///
/// Holds the single profile row, the append-only `chat_history` table and
/// the append-only `summary` table. Rows of one session are ordered by
/// insertion.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), MnemaError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), MnemaError>;

    /// Reads the profile row. A missing row yields an empty profile.
    async fn get_profile(&self) -> Result<Profile, MnemaError>;

    /// Reads, merges and writes the profile row as one critical section.
    ///
    /// Returns the profile as persisted after the merge.
    async fn merge_profile(&self, update: &ProfileUpdate) -> Result<Profile, MnemaError>;

    /// Appends one pair to the session's history. Either the whole pair is
    /// written or an error is returned.
    async fn insert_pair(
        &self,
        session_id: &str,
        user_id: &str,
        pair: &TurnPair,
    ) -> Result<i64, MnemaError>;

    /// Returns the most recent `n` pairs of the session, oldest first.
    async fn recent_pairs(&self, session_id: &str, n: usize) -> Result<Vec<TurnPair>, MnemaError>;

    /// Counts the persisted pairs of the session.
    async fn count_pairs(&self, session_id: &str) -> Result<u64, MnemaError>;

    /// Appends a summary row.
    async fn insert_summary(
        &self,
        session_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<i64, MnemaError>;

    /// Returns the most recently created summary of the session.
    async fn latest_summary(&self, session_id: &str) -> Result<Option<SummaryRecord>, MnemaError>;
}
