// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns Figment extraction failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean" hint (Jaro-Winkler) and, when the
//! offending file can be re-read, a labelled source span.

#![allow(unused_assignments)] // miette's Diagnostic derive triggers this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem ready to be rendered.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config struct declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(mnema::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted by the enclosing section.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(mnema::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key.
        key: String,
        detail: String,
        expected: String,
    },

    /// A required key without a default.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(mnema::config::missing_key),
        help("add `{key} = <value>` to mnema.toml")
    )]
    MissingKey { key: String },

    /// A semantic constraint on a value did not hold.
    #[error("validation error: {message}")]
    #[diagnostic(code(mnema::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mnema::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Flattens a (possibly multi-error) `figment::Error` into diagnostics.
///
/// `toml_sources` holds `(path, content)` pairs used to locate spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid: Vec<&str> = expected.to_vec();
                let (span, src) = locate(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid),
                    valid_keys: valid.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: dotted_path(&error),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn dotted_path(error: &figment::error::Error) -> String {
    error
        .path
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn locate(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        // Inline strings have no file path; fall back to the only source given.
        _ if toml_sources.len() == 1 => toml_sources[0].0.clone(),
        _ => return (None, None),
    };

    let Some((path, content)) = toml_sources.iter().find(|(p, _)| *p == origin) else {
        return (None, None);
    };

    let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
    match find_key_offset(content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside the `[path[0]]` table of `content`.
///
/// Top-level keys (empty `path`) are searched from the start of the file.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && offset != start {
            // Next table: the key is not in this section.
            return None;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Best Jaro-Winkler match above the threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_history_key() {
        let valid = &["max_history_pairs", "max_tokens", "max_characters"];
        assert_eq!(
            suggest_key("max_histroy_pairs", valid),
            Some("max_history_pairs".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["api_key", "base_url", "chat_model"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_its_section() {
        let content = "[agent]\nname = \"x\"\n[provider]\nchat_modle = \"m\"\n";
        let path = vec!["provider".to_string()];
        let o = find_key_offset(content, &path, "chat_modle").unwrap();
        assert_eq!(&content[o..o + 10], "chat_modle");
    }

    #[test]
    fn key_in_a_later_section_is_not_matched() {
        let content = "[agent]\nname = \"x\"\n[memory]\nk = 3\n";
        assert!(find_key_offset(content, &["agent".to_string()], "k").is_none());
        assert!(find_key_offset(content, &["storage".to_string()], "k").is_none());
    }

    #[test]
    fn unknown_key_help_lists_keys() {
        assert_eq!(
            unknown_key_help(Some("k"), "k, enabled"),
            "did you mean `k`? Valid keys: k, enabled"
        );
        assert_eq!(unknown_key_help(None, "k"), "valid keys: k");
    }
}
