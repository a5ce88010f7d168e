// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable summaries seeded by the previous summary.

use mnema_core::{ChatMessage, MnemaError, ProviderAdapter, ProviderRequest, TurnPair};
use tracing::info;

/// Builds the summarization prompt for `pairs`, continuing from `previous`.
pub fn build_summary_prompt(pairs: &[TurnPair], previous: Option<&str>) -> String {
    let mut prompt = String::from("Summarize the following conversation:\n\n");
    if let Some(previous) = previous.filter(|p| !p.trim().is_empty()) {
        prompt.push_str(&format!("Previous summary:\n{previous}\n\n"));
    }
    for pair in pairs {
        prompt.push_str(&pair.render());
        prompt.push_str("\n\n");
    }
    prompt.push_str("Provide a concise summary while preserving the important details.");
    prompt
}

/// Produces one summary text for `pairs`.
pub async fn generate_summary(
    provider: &dyn ProviderAdapter,
    model: &str,
    max_tokens: u32,
    pairs: &[TurnPair],
    previous: Option<&str>,
) -> Result<String, MnemaError> {
    let request = ProviderRequest::new(
        model,
        vec![ChatMessage::system(build_summary_prompt(pairs, previous))],
    )
    .with_max_tokens(max_tokens);

    let response = provider.complete(request).await?;
    let text = response
        .non_empty_text()
        .ok_or_else(|| MnemaError::Provider {
            message: "summary model returned no text".into(),
            source: None,
        })?
        .to_string();

    info!(
        model,
        pairs = pairs.len(),
        seeded = previous.is_some(),
        "session summary generated"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_previous_summary() {
        let prompt = build_summary_prompt(&[TurnPair::new("Q2", "A2")], None);
        assert!(prompt.starts_with("Summarize the following conversation:"));
        assert!(prompt.contains("User: Q2\nAssistant: A2"));
        assert!(!prompt.contains("Previous summary"));
    }

    #[test]
    fn prompt_is_seeded_by_previous_summary() {
        let pairs = [TurnPair::new("Q2", "A2"), TurnPair::new("Q3", "A3")];
        let prompt = build_summary_prompt(&pairs, Some("They talked about Rome."));
        let seed = prompt.find("Previous summary:\nThey talked about Rome.").unwrap();
        let q2 = prompt.find("User: Q2").unwrap();
        let q3 = prompt.find("User: Q3").unwrap();
        assert!(seed < q2 && q2 < q3);
    }
}
