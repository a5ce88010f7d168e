// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-through history buffer for one session.

use std::sync::Arc;

use mnema_core::{MnemaError, Session, StorageAdapter, TurnPair};
use tracing::{debug, warn};

use crate::window::HistoryWindow;

/// The in-memory window of a session plus write-through persistence.
///
/// A buffer is owned by exactly one session; turns on it must be
/// serialized by the caller.
pub struct HistoryBuffer {
    storage: Arc<dyn StorageAdapter>,
    session: Session,
    window: HistoryWindow,
}

impl HistoryBuffer {
    pub fn new(storage: Arc<dyn StorageAdapter>, session: Session, max_pairs: usize) -> Self {
        Self {
            storage,
            session,
            window: HistoryWindow::new(max_pairs),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    pub(crate) fn window_mut(&mut self) -> &mut HistoryWindow {
        &mut self.window
    }

    pub(crate) fn storage(&self) -> &dyn StorageAdapter {
        self.storage.as_ref()
    }

    pub fn pairs_since_last_summary(&self) -> u32 {
        self.session.pairs_since_last_summary
    }

    pub(crate) fn reset_summary_counter(&mut self) {
        self.session.pairs_since_last_summary = 0;
    }

    /// Appends one pair to the window and persists it.
    ///
    /// The window is always updated. A persistence failure is returned to
    /// the caller and the pair does not count toward the summary trigger.
    pub async fn append(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) -> Result<(), MnemaError> {
        let pair = TurnPair::new(user_text, assistant_text);
        self.window.push_pair(pair.clone());

        match self
            .storage
            .insert_pair(
                self.session.session_id.as_str(),
                &self.session.user_id,
                &pair,
            )
            .await
        {
            Ok(row_id) => {
                self.session.pairs_since_last_summary += 1;
                debug!(
                    session_id = %self.session.session_id,
                    row_id,
                    pairs_since_last_summary = self.session.pairs_since_last_summary,
                    "pair persisted"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    session_id = %self.session.session_id,
                    error = %e,
                    "pair kept in memory but not persisted"
                );
                Err(e)
            }
        }
    }

    /// Text of the session's most recent summary, if any.
    pub async fn latest_summary(&self) -> Result<Option<String>, MnemaError> {
        Ok(self
            .storage
            .latest_summary(self.session.session_id.as_str())
            .await?
            .map(|s| s.text))
    }

    /// The newest `n` persisted pairs, oldest first. Reads the durable log,
    /// so pairs already evicted from the window are included.
    pub async fn recent_pairs(&self, n: usize) -> Result<Vec<TurnPair>, MnemaError> {
        self.storage
            .recent_pairs(self.session.session_id.as_str(), n)
            .await
    }
}
