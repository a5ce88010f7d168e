// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.

use mnema_core::{Profile, ProfileField};
use mnema_skill::{Dispatched, ToolName};

/// Appended to the prompt of the final, tool-less call of a turn.
pub const LIMIT_NOTICE: &str = "## Tool call limit reached\n\
Do not request any more tools. Conclude the conversation with the user based on the \
information available above.";

/// Inputs of one system prompt.
pub struct PromptParts<'a> {
    pub persona: Option<&'a str>,
    pub profile: &'a Profile,
    pub summary: Option<&'a str>,
    /// Serialized history window.
    pub history: &'a str,
    /// Outcome of the previous dispatch in this turn, possibly followed by
    /// the limit notice. Empty on the first call.
    pub outcome_section: &'a str,
}

fn profile_keys() -> String {
    ProfileField::accepted_keys()
        .split(", ")
        .map(|k| format!("- {k}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_system_prompt(parts: &PromptParts<'_>) -> String {
    let mut prompt = String::new();
    if let Some(persona) = parts.persona.filter(|p| !p.trim().is_empty()) {
        prompt.push_str(persona.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str("## You are the personal assistant of this user\n\n");
    if parts.profile.is_empty() {
        prompt.push_str("Nothing is known about the user yet.\n\n");
    } else {
        prompt.push_str(&parts.profile.render());
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "## Tools: {search} and {add}\n\n\
         - Call {search} with a precise query when answering needs details from earlier \
         conversations with the user.\n\
         - Call {add} when the user shares personal details that are new or differ from the \
         profile above. Accepted keys:\n{keys}\n\n\
         You talk to the user directly and decide on tool calls yourself. A tool result \
         appears below once a call was made. Do not repeat a call that succeeded, and stop \
         calling tools once the limit is reached.\n\n",
        search = ToolName::SEARCH_MEMORY,
        add = ToolName::ADD_USER_INFO,
        keys = profile_keys(),
    ));

    if !parts.outcome_section.is_empty() {
        prompt.push_str(parts.outcome_section);
        prompt.push_str("\n\n");
    }

    prompt.push_str("## Summary of earlier conversation\n\n");
    prompt.push_str(parts.summary.unwrap_or("None yet."));
    prompt.push_str("\n\n## Recent conversation\n\n");
    prompt.push_str(parts.history);
    prompt.push_str("\n\n## The user's new message follows");
    prompt
}

/// Renders what happened on the previous dispatch so the model can react
/// to it without issuing the same call again.
pub fn outcome_block(dispatched: &Dispatched) -> String {
    let mut block = String::new();
    let arguments: String = dispatched
        .arguments
        .iter()
        .map(|(k, v)| format!("  - {k}: {v}\n"))
        .collect();

    if dispatched.outcome.is_success() {
        block.push_str("## Tool call executed\n\n");
        block.push_str(&format!(
            "- You called `{}` for the user's latest message.\n- Arguments:\n{arguments}",
            dispatched.name
        ));
        block.push_str(&format!(
            "- Outcome: success\n\nContinue the conversation using this result:\n{}",
            dispatched.outcome.detail
        ));
    } else {
        block.push_str("## Tool call attempted\n\n");
        block.push_str(&format!(
            "- You tried to call `{}`.\n- Arguments:\n{arguments}",
            dispatched.name
        ));
        block.push_str(&format!(
            "- Outcome: failure - {}\n\nHelp the user based on this result.",
            dispatched.outcome.detail
        ));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::ToolOutcome;

    fn dispatched(outcome: ToolOutcome) -> Dispatched {
        let mut arguments = serde_json::Map::new();
        arguments.insert("query".into(), "rome".into());
        Dispatched {
            name: ToolName::SearchMemory,
            arguments,
            outcome,
            effect: None,
            timed_out: None,
        }
    }

    #[test]
    fn prompt_sections_in_order() {
        let mut profile = Profile::default();
        profile.location = Some("Italy".into());
        let prompt = build_system_prompt(&PromptParts {
            persona: Some("You are Mnema."),
            profile: &profile,
            summary: Some("They discussed pasta."),
            history: r#"[{"user":"hi"},{"assistant":"hello"}]"#,
            outcome_section: "## Tool call executed",
        });

        let idx = |needle: &str| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(prompt.starts_with("You are Mnema."));
        assert!(idx("location: Italy") < idx("## Tools"));
        assert!(idx("## Tools") < idx("## Tool call executed"));
        assert!(idx("## Tool call executed") < idx("They discussed pasta."));
        assert!(idx("They discussed pasta.") < idx(r#"{"user":"hi"}"#));
        assert!(prompt.contains("- last_name"));
    }

    #[test]
    fn empty_profile_and_summary() {
        let prompt = build_system_prompt(&PromptParts {
            persona: None,
            profile: &Profile::default(),
            summary: None,
            history: "[]",
            outcome_section: "",
        });
        assert!(prompt.contains("Nothing is known about the user yet."));
        assert!(prompt.contains("None yet."));
        assert!(!prompt.contains("Tool call executed"));
    }

    #[test]
    fn success_block_carries_result() {
        let block = outcome_block(&dispatched(ToolOutcome::success("User: I live in Rome")));
        assert!(block.starts_with("## Tool call executed"));
        assert!(block.contains("`search_vector_db`"));
        assert!(block.contains("  - query: \"rome\""));
        assert!(block.contains("User: I live in Rome"));
    }

    #[test]
    fn failure_block_carries_detail() {
        let block = outcome_block(&dispatched(ToolOutcome::failure("No result found.")));
        assert!(block.starts_with("## Tool call attempted"));
        assert!(block.contains("failure - No result found."));
    }
}
