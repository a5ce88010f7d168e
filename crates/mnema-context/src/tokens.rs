// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token counting with the `o200k_base` encoding.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;
use tracing::warn;

static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn encoder() -> Option<&'static CoreBPE> {
    ENCODER
        .get_or_init(|| match tiktoken_rs::o200k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(error = %e, "o200k_base unavailable, falling back to character estimate");
                None
            }
        })
        .as_ref()
}

/// Counts the tokens of `text`.
///
/// Falls back to the 4-characters-per-token estimate when the encoding
/// cannot be loaded.
pub fn count_tokens(text: &str) -> usize {
    match encoder() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.chars().count().div_ceil(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn longer_text_has_more_tokens() {
        let short = count_tokens("hello");
        let long = count_tokens(&"hello world ".repeat(50));
        assert!(short >= 1);
        assert!(long > short * 10);
    }
}
