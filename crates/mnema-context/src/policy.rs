// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarization policy: the two post-append triggers.
//!
//! - Token budget: when the serialized window exceeds `max_tokens`, every
//!   pair but the newest is paraphrased in place. Any failure leaves the
//!   window untouched.
//! - Pair count: once `max_history_pairs` pairs were persisted since the
//!   last summary, a durable summary row is written. The counter resets
//!   only when that row is stored.

use std::sync::Arc;
use std::time::Duration;

use mnema_config::model::{HistoryConfig, ProviderConfig};
use mnema_core::{MnemaError, ProviderAdapter};
use tracing::{debug, info, warn};

use crate::buffer::HistoryBuffer;
use crate::{compaction, summary};

/// Pairs kept verbatim when the window is compacted.
pub const COMPACTION_KEEP_PAIRS: usize = 1;

/// Result of the token-budget trigger.
#[derive(Debug)]
pub enum CompactionOutcome {
    Skipped,
    Compacted {
        tokens_before: usize,
        tokens_after: usize,
        pairs_summarized: usize,
    },
    Failed(MnemaError),
}

/// Result of the pair-count trigger.
#[derive(Debug)]
pub enum SummaryOutcome {
    Skipped,
    Summarized { summary_id: i64 },
    Failed(MnemaError),
}

/// Both outcomes of one post-append policy run.
#[derive(Debug)]
pub struct PolicyReport {
    pub compaction: CompactionOutcome,
    pub summary: SummaryOutcome,
}

pub struct SummarizationPolicy {
    provider: Arc<dyn ProviderAdapter>,
    summary_model: String,
    max_tokens: usize,
    max_history_pairs: usize,
    output_max_tokens: u32,
    call_timeout: Duration,
}

impl SummarizationPolicy {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        history: &HistoryConfig,
        provider_config: &ProviderConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            summary_model: provider_config.summary_model.clone(),
            max_tokens: history.max_tokens,
            max_history_pairs: history.max_history_pairs,
            output_max_tokens: history.compaction_max_tokens,
            call_timeout,
        }
    }

    /// Runs both triggers, compaction first.
    pub async fn after_append(&self, buffer: &mut HistoryBuffer) -> PolicyReport {
        let compaction = self.maybe_compact(buffer).await;
        let summary = self.maybe_summarize(buffer).await;
        PolicyReport {
            compaction,
            summary,
        }
    }

    /// Token-budget trigger.
    pub async fn maybe_compact(&self, buffer: &mut HistoryBuffer) -> CompactionOutcome {
        let tokens_before = buffer.window().token_count();
        if tokens_before <= self.max_tokens {
            return CompactionOutcome::Skipped;
        }

        let older = buffer.window().older_pairs(COMPACTION_KEEP_PAIRS);
        if older.is_empty() {
            debug!(tokens_before, "window over budget but nothing older to compact");
            return CompactionOutcome::Skipped;
        }

        let call = compaction::summarize_pairs(
            self.provider.as_ref(),
            &self.summary_model,
            self.output_max_tokens,
            &older,
        );
        let result = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MnemaError::Timeout {
                duration: self.call_timeout,
            }),
        };

        match result {
            Ok(summarized) => {
                buffer
                    .window_mut()
                    .replace_older(summarized, COMPACTION_KEEP_PAIRS);
                let tokens_after = buffer.window().token_count();
                info!(
                    session_id = %buffer.session().session_id,
                    tokens_before,
                    tokens_after,
                    pairs_summarized = older.len(),
                    "history window compacted"
                );
                CompactionOutcome::Compacted {
                    tokens_before,
                    tokens_after,
                    pairs_summarized: older.len(),
                }
            }
            Err(e) => {
                warn!(
                    session_id = %buffer.session().session_id,
                    error = %e,
                    "compaction aborted, window kept as is"
                );
                CompactionOutcome::Failed(e)
            }
        }
    }

    /// Pair-count trigger.
    pub async fn maybe_summarize(&self, buffer: &mut HistoryBuffer) -> SummaryOutcome {
        let threshold = self.max_history_pairs;
        if (buffer.pairs_since_last_summary() as usize) < threshold {
            return SummaryOutcome::Skipped;
        }

        match self.write_summary(buffer).await {
            Ok(Some(summary_id)) => {
                buffer.reset_summary_counter();
                SummaryOutcome::Summarized { summary_id }
            }
            Ok(None) => SummaryOutcome::Skipped,
            Err(e) => {
                warn!(
                    session_id = %buffer.session().session_id,
                    error = %e,
                    "summary generation failed, will retry after the next pair"
                );
                SummaryOutcome::Failed(e)
            }
        }
    }

    async fn write_summary(&self, buffer: &HistoryBuffer) -> Result<Option<i64>, MnemaError> {
        let session = buffer.session();
        let session_id = session.session_id.as_str();
        let threshold = self.max_history_pairs;

        let persisted = buffer.storage().count_pairs(session_id).await?;
        if persisted <= threshold as u64 {
            debug!(session_id, persisted, threshold, "not enough history to summarize yet");
            return Ok(None);
        }

        let pairs = buffer.recent_pairs(threshold).await?;
        let previous = buffer.latest_summary().await?;

        let call = summary::generate_summary(
            self.provider.as_ref(),
            &self.summary_model,
            self.output_max_tokens,
            &pairs,
            previous.as_deref(),
        );
        let text = tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| MnemaError::Timeout {
                duration: self.call_timeout,
            })??;

        let id = buffer
            .storage()
            .insert_summary(session_id, &session.user_id, &text)
            .await?;
        info!(session_id, summary_id = id, pairs = pairs.len(), "session summary stored");
        Ok(Some(id))
    }
}
