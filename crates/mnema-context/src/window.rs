// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory history window.

use mnema_core::{Role, Turn, TurnPair};

use crate::tokens::count_tokens;

/// The most recent turns of a session, alternating user/assistant.
///
/// Invariants: the length is even, entries start with a user turn, and the
/// window never holds more than `2 * max_pairs` entries. The oldest entries
/// are evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    turns: Vec<Turn>,
    max_pairs: usize,
}

impl HistoryWindow {
    pub fn new(max_pairs: usize) -> Self {
        Self {
            turns: Vec::with_capacity(max_pairs * 2),
            max_pairs: max_pairs.max(1),
        }
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len_pairs(&self) -> usize {
        self.turns.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a pair and evicts from the front to stay within capacity.
    pub fn push_pair(&mut self, pair: TurnPair) {
        self.turns.extend(pair.into_turns());
        self.evict();
    }

    fn evict(&mut self) {
        let cap = self.max_pairs * 2;
        if self.turns.len() > cap {
            let excess = self.turns.len() - cap;
            self.turns.drain(..excess);
        }
    }

    /// The window grouped back into pairs, oldest first.
    pub fn pairs(&self) -> Vec<TurnPair> {
        self.turns
            .chunks_exact(2)
            .map(|c| TurnPair::new(c[0].text.clone(), c[1].text.clone()))
            .collect()
    }

    /// JSON list with one single-key object per entry, e.g.
    /// `[{"user":"hi"},{"assistant":"hello"}]`. This is the text that is
    /// measured against the token budget and embedded in the system prompt.
    pub fn serialize(&self) -> String {
        let entries: Vec<serde_json::Value> = self
            .turns
            .iter()
            .map(|t| {
                let key = match t.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                };
                serde_json::json!({ key: t.text })
            })
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    pub fn token_count(&self) -> usize {
        count_tokens(&self.serialize())
    }

    /// Replaces every pair except the newest `keep_pairs` with `summarized`.
    ///
    /// Capacity is re-applied afterwards, so a summarizer that returns more
    /// pairs than fit only keeps the newest of them.
    pub fn replace_older(&mut self, summarized: Vec<TurnPair>, keep_pairs: usize) {
        let keep_from = self.turns.len().saturating_sub(keep_pairs * 2);
        let kept = self.turns.split_off(keep_from);
        self.turns = summarized.into_iter().flat_map(TurnPair::into_turns).collect();
        self.turns.extend(kept);
        self.evict();
    }

    /// Pairs that compaction would hand to the summarizer when keeping
    /// the newest `keep_pairs`.
    pub fn older_pairs(&self, keep_pairs: usize) -> Vec<TurnPair> {
        let pairs = self.pairs();
        let split = pairs.len().saturating_sub(keep_pairs);
        pairs[..split].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(i: usize) -> TurnPair {
        TurnPair::new(format!("Q{i}"), format!("A{i}"))
    }

    #[test]
    fn evicts_oldest_pair() {
        let mut window = HistoryWindow::new(2);
        for i in 1..=3 {
            window.push_pair(pair(i));
        }
        let pairs = window.pairs();
        assert_eq!(pairs, vec![pair(2), pair(3)]);
    }

    #[test]
    fn serializes_as_single_key_entries() {
        let mut window = HistoryWindow::new(2);
        window.push_pair(TurnPair::new("hi", "hello"));
        assert_eq!(window.serialize(), r#"[{"user":"hi"},{"assistant":"hello"}]"#);
        assert_eq!(HistoryWindow::new(2).serialize(), "[]");
    }

    #[test]
    fn replace_older_keeps_newest_pair() {
        let mut window = HistoryWindow::new(3);
        for i in 1..=3 {
            window.push_pair(pair(i));
        }
        assert_eq!(window.older_pairs(1), vec![pair(1), pair(2)]);

        window.replace_older(vec![TurnPair::new("S-user", "S-assistant")], 1);
        assert_eq!(
            window.pairs(),
            vec![TurnPair::new("S-user", "S-assistant"), pair(3)]
        );
    }

    #[test]
    fn replace_older_truncates_oversized_summary() {
        let mut window = HistoryWindow::new(2);
        window.push_pair(pair(1));
        window.push_pair(pair(2));
        window.replace_older(vec![pair(10), pair(11), pair(12)], 1);
        assert_eq!(window.pairs(), vec![pair(12), pair(2)]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn window_stays_even_and_bounded(max in 1usize..6, pushes in 0usize..20) {
            let mut window = HistoryWindow::new(max);
            for i in 0..pushes {
                window.push_pair(pair(i));
                prop_assert_eq!(window.turns().len() % 2, 0);
                prop_assert!(window.turns().len() <= 2 * max);
                prop_assert_eq!(window.turns()[0].role, Role::User);
            }
            if pushes > 0 {
                let last = window.pairs().pop();
                prop_assert_eq!(last, Some(pair(pushes - 1)));
            }
        }

        #[test]
        fn replace_older_preserves_invariants(max in 1usize..5, pushes in 1usize..8, summarized in 0usize..6) {
            let mut window = HistoryWindow::new(max);
            for i in 0..pushes {
                window.push_pair(pair(i));
            }
            window.replace_older((100..100 + summarized).map(pair).collect(), 1);
            prop_assert_eq!(window.turns().len() % 2, 0);
            prop_assert!(window.turns().len() <= 2 * max);
            prop_assert_eq!(window.pairs().pop(), Some(pair(pushes - 1)));
        }
    }
}
