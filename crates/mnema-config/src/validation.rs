// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express. All problems are
//! collected; validation does not stop at the first one.

use crate::diagnostic::ConfigError;
use crate::model::MnemaConfig;

/// Embedding backends the memory section may name.
pub const KNOWN_EMBEDDERS: &[&str] = &["mistral", "hashing"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MnemaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid("storage.database_path must not be empty"));
    }

    if config.history.max_history_pairs == 0 {
        errors.push(ConfigError::invalid(
            "history.max_history_pairs must be at least 1",
        ));
    }

    if config.history.max_tokens == 0 {
        errors.push(ConfigError::invalid("history.max_tokens must be positive"));
    }

    if config.history.max_characters == 0 {
        errors.push(ConfigError::invalid(
            "history.max_characters must be positive",
        ));
    }

    let temperature = config.provider.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(ConfigError::invalid(format!(
            "provider.temperature must be within [0, 2], got {temperature}"
        )));
    }

    if config.provider.base_url.trim().is_empty() {
        errors.push(ConfigError::invalid("provider.base_url must not be empty"));
    }

    if config.agent.request_timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "agent.request_timeout_secs must be at least 1",
        ));
    }

    if config.memory.k == 0 {
        errors.push(ConfigError::invalid("memory.k must be at least 1"));
    }

    if !KNOWN_EMBEDDERS.contains(&config.memory.embedder.as_str()) {
        errors.push(ConfigError::invalid(format!(
            "memory.embedder `{}` is not one of: {}",
            config.memory.embedder,
            KNOWN_EMBEDDERS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &MnemaConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&MnemaConfig::default()).is_ok());
    }

    #[test]
    fn zero_history_pairs_fails() {
        let mut config = MnemaConfig::default();
        config.history.max_history_pairs = 0;
        assert!(messages(&config).iter().any(|m| m.contains("max_history_pairs")));
    }

    #[test]
    fn temperature_out_of_range_fails() {
        let mut config = MnemaConfig::default();
        config.provider.temperature = 3.5;
        assert!(messages(&config).iter().any(|m| m.contains("temperature")));
    }

    #[test]
    fn unknown_embedder_fails() {
        let mut config = MnemaConfig::default();
        config.memory.embedder = "onnx".into();
        assert!(messages(&config).iter().any(|m| m.contains("`onnx`")));
    }

    #[test]
    fn collects_every_problem() {
        let mut config = MnemaConfig::default();
        config.storage.database_path = " ".into();
        config.memory.k = 0;
        config.agent.request_timeout_secs = 0;
        assert_eq!(validate_config(&config).unwrap_err().len(), 3);
    }
}
