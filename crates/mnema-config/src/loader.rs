// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mnema.toml` > `~/.config/mnema/mnema.toml` > `/etc/mnema/mnema.toml`
//! with environment variable overrides via the `MNEMA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MnemaConfig;

pub(crate) const LOCAL_CONFIG: &str = "mnema.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/mnema/mnema.toml";

/// Sections that `MNEMA_<SECTION>_<KEY>` variables may target.
const ENV_SECTIONS: &[&str] = &["agent", "provider", "history", "storage", "memory"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mnema").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnema/mnema.toml` (system-wide)
/// 3. `~/.config/mnema/mnema.toml` (user XDG config)
/// 4. `./mnema.toml` (local directory)
/// 5. `MNEMA_*` environment variables
pub fn load_config() -> Result<MnemaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MnemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `section_key` (prefix already stripped) to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `MNEMA_HISTORY_MAX_HISTORY_PAIRS` lands on `history.max_history_pairs`.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

fn env_provider() -> Env {
    Env::prefixed("MNEMA_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("provider_api_key"), "provider.api_key");
        assert_eq!(
            map_env_key("history_max_history_pairs"),
            "history.max_history_pairs"
        );
        assert_eq!(map_env_key("agent_max_function_calls"), "agent.max_function_calls");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "[provider]\nchat_model = \"from-file\"\n[history]\nmax_tokens = 900\n",
            )?;
            jail.set_env("MNEMA_PROVIDER_CHAT_MODEL", "from-env");
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.provider.chat_model, "from-env");
            assert_eq!(config.history.max_tokens, 900);
            Ok(())
        });
    }
}
