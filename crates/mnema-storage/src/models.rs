// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types that only the storage layer and its callers see.

/// One line of the session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOverview {
    pub session_id: String,
    pub pairs: u64,
    /// Timestamp of the newest pair.
    pub last_at: String,
}
