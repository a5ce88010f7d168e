// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile model and merge semantics.
//!
//! The profile is a single row per deployment. It changes only through
//! [`Profile::apply`]: `interests` merge as a set union, every other field
//! overwrites.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::MnemaError;

/// The closed set of profile fields a merge may touch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProfileField {
    Name,
    LastName,
    Age,
    Gender,
    Location,
    Occupation,
    Interests,
}

impl ProfileField {
    /// Comma-separated list of accepted keys, used in error details.
    pub fn accepted_keys() -> String {
        ProfileField::iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A user's attributes. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub interests: BTreeSet<String>,
}

impl Profile {
    /// Returns the scalar value stored for `field`, if any.
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::Name => &self.name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Age => &self.age,
            ProfileField::Gender => &self.gender,
            ProfileField::Location => &self.location,
            ProfileField::Occupation => &self.occupation,
            ProfileField::Interests => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    fn slot_mut(&mut self, field: ProfileField) -> Option<&mut Option<String>> {
        match field {
            ProfileField::Name => Some(&mut self.name),
            ProfileField::LastName => Some(&mut self.last_name),
            ProfileField::Age => Some(&mut self.age),
            ProfileField::Gender => Some(&mut self.gender),
            ProfileField::Location => Some(&mut self.location),
            ProfileField::Occupation => Some(&mut self.occupation),
            ProfileField::Interests => None,
        }
    }

    /// Merges an update into this profile.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        for (field, value) in &update.fields {
            if let Some(slot) = self.slot_mut(*field) {
                *slot = Some(value.clone());
            }
        }
        self.interests.extend(update.interests.iter().cloned());
    }

    /// Canonical column form of the interests set: sorted, comma-joined.
    pub fn interests_column(&self) -> String {
        join_interests(&self.interests)
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
            && ProfileField::iter()
                .filter(|f| *f != ProfileField::Interests)
                .all(|f| self.get(f).is_none())
    }

    /// Renders the known fields as `key: value` lines for prompt assembly.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for field in ProfileField::iter() {
            if field == ProfileField::Interests {
                if !self.interests.is_empty() {
                    lines.push(format!("{field}: {}", self.interests_column()));
                }
            } else if let Some(value) = self.get(field) {
                lines.push(format!("{field}: {value}"));
            }
        }
        lines.join("\n")
    }
}

/// A validated profile update produced from a tool's argument mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub fields: BTreeMap<ProfileField, String>,
    pub interests: BTreeSet<String>,
}

impl ProfileUpdate {
    /// Validates a raw JSON mapping.
    ///
    /// Any key outside [`ProfileField`] rejects the whole update. Scalar
    /// values may be strings, numbers or booleans. `interests` accepts a list
    /// of strings or a comma-separated string.
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self, MnemaError> {
        let mut update = ProfileUpdate::default();
        for (key, value) in map {
            let field = ProfileField::from_str(key)
                .map_err(|_| MnemaError::InvalidProfileKey { key: key.clone() })?;
            if field == ProfileField::Interests {
                update.interests = normalize_interests(value)?;
            } else {
                let text = scalar_to_string(value).ok_or_else(|| {
                    MnemaError::MalformedToolArguments {
                        tool: "add_user_info_to_database".into(),
                        detail: format!("value for '{key}' must be a string or number"),
                    }
                })?;
                update.fields.insert(field, text);
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.interests.is_empty()
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalizes an interests value into a set of trimmed, non-empty strings.
pub fn normalize_interests(value: &serde_json::Value) -> Result<BTreeSet<String>, MnemaError> {
    let malformed = |detail: &str| MnemaError::MalformedToolArguments {
        tool: "add_user_info_to_database".into(),
        detail: detail.into(),
    };
    match value {
        serde_json::Value::String(s) => Ok(parse_interests(s)),
        serde_json::Value::Array(items) => {
            let mut set = BTreeSet::new();
            for item in items {
                let s = item
                    .as_str()
                    .ok_or_else(|| malformed("interests list must contain strings"))?;
                let s = s.trim();
                if !s.is_empty() {
                    set.insert(s.to_string());
                }
            }
            Ok(set)
        }
        serde_json::Value::Null => Ok(BTreeSet::new()),
        _ => Err(malformed(
            "interests must be a list or a comma-separated string",
        )),
    }
}

/// Parses the stored comma-separated interests column.
pub fn parse_interests(column: &str) -> BTreeSet<String> {
    column
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins interests in canonical (sorted) order.
pub fn join_interests(interests: &BTreeSet<String>) -> String {
    interests.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
