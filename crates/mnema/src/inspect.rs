// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnema profile` and `mnema history` implementations.

use colored::Colorize;
use mnema_config::MnemaConfig;
use mnema_core::{MnemaError, Profile, ProfileUpdate, StorageAdapter};
use serde_json::{Map, Value};

use crate::runtime::open_storage;

/// Prints the stored profile.
pub async fn profile_show(config: &MnemaConfig) -> Result<(), MnemaError> {
    let storage = open_storage(config).await?;
    let profile = storage.get_profile().await?;
    print_profile(&profile);
    storage.close().await
}

/// Merges `key=value` assignments through the same validation the
/// `add_user_info_to_database` tool uses.
pub async fn profile_set(config: &MnemaConfig, assignments: &[String]) -> Result<(), MnemaError> {
    let map = parse_assignments(assignments)?;
    let update = ProfileUpdate::from_map(&map)?;

    let storage = open_storage(config).await?;
    let profile = storage.merge_profile(&update).await?;
    println!("{}", "profile updated".green());
    print_profile(&profile);
    storage.close().await
}

/// Prints the last `pairs` pairs of `session`, or the session list.
pub async fn history(
    config: &MnemaConfig,
    session: Option<&str>,
    pairs: usize,
) -> Result<(), MnemaError> {
    let storage = open_storage(config).await?;

    match session {
        None => {
            let sessions = storage.list_sessions().await?;
            if sessions.is_empty() {
                println!("no stored sessions");
            }
            for s in sessions {
                println!("{}  {:>4} pairs  last {}", s.session_id, s.pairs, s.last_at.dimmed());
            }
        }
        Some(session_id) => {
            let recent = storage.recent_pairs(session_id, pairs).await?;
            if recent.is_empty() {
                println!("no history for session {session_id}");
            }
            for pair in recent {
                println!("{} {}", "user>".cyan().bold(), pair.user);
                println!("{} {}\n", "mnema>".green().bold(), pair.assistant);
            }
            if let Some(summary) = storage.latest_summary(session_id).await? {
                println!("{}\n{}", "summary:".yellow(), summary.text);
            }
        }
    }

    storage.close().await
}

fn print_profile(profile: &Profile) {
    if profile.is_empty() {
        println!("{}", "no profile information stored".dimmed());
    } else {
        println!("{}", profile.render());
    }
}

/// Turns `key=value` arguments into a JSON mapping of string values.
fn parse_assignments(assignments: &[String]) -> Result<Map<String, Value>, MnemaError> {
    let mut map = Map::new();
    for raw in assignments {
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            MnemaError::Config(format!("expected key=value, got '{raw}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(MnemaError::Config(format!("missing key in '{raw}'")));
        }
        map.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(map)
}
