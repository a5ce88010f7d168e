// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Window compaction: paraphrases older pairs via the summary model so the
//! serialized window fits its token budget.

use mnema_core::{ChatMessage, MnemaError, ProviderAdapter, ProviderRequest, TurnPair};
use serde_json::Value;

/// Builds the user prompt asking the model to rewrite `older` as fewer pairs.
pub fn build_compaction_prompt(older: &[TurnPair]) -> String {
    let entries: Vec<Value> = older
        .iter()
        .map(|p| serde_json::json!({"user": p.user, "assistant": p.assistant}))
        .collect();
    format!(
        "Summarize the following conversation while preserving the key details and the \
         conversation's tone: {}\n\nReturn the summarized conversation as a JSON list of \
         objects, each with a \"user\" and an \"assistant\" field.",
        Value::Array(entries)
    )
}

/// Strips an optional Markdown code fence around the model output.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn pair_from_value(value: &Value) -> Result<TurnPair, MnemaError> {
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MnemaError::CompactionParse(format!("entry without a '{key}' string")))
    };
    Ok(TurnPair::new(field("user")?, field("assistant")?))
}

/// Parses the summarizer output into pairs.
///
/// Accepts a JSON list of `{user, assistant}` objects or a single such
/// object. Anything else, including an empty list, is a parse failure.
pub fn parse_summarized_pairs(text: &str) -> Result<Vec<TurnPair>, MnemaError> {
    let value: Value = serde_json::from_str(strip_fence(text))
        .map_err(|e| MnemaError::CompactionParse(format!("not JSON: {e}")))?;

    let pairs = match &value {
        Value::Object(_) => vec![pair_from_value(&value)?],
        Value::Array(items) => items
            .iter()
            .map(pair_from_value)
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(MnemaError::CompactionParse(format!(
                "expected a list of pairs, got {other}"
            )));
        }
    };

    if pairs.is_empty() {
        return Err(MnemaError::CompactionParse("summarizer returned no pairs".into()));
    }
    Ok(pairs)
}

/// Asks the summary model to paraphrase `older` and parses its reply.
pub async fn summarize_pairs(
    provider: &dyn ProviderAdapter,
    model: &str,
    max_tokens: u32,
    older: &[TurnPair],
) -> Result<Vec<TurnPair>, MnemaError> {
    let request = ProviderRequest::new(
        model,
        vec![ChatMessage::user(build_compaction_prompt(older))],
    )
    .with_max_tokens(max_tokens);

    let response = provider.complete(request).await?;
    let text = response
        .non_empty_text()
        .ok_or_else(|| MnemaError::CompactionParse("summarizer returned no text".into()))?;
    parse_summarized_pairs(text)
}
