// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `add_user_info_to_database`: merges facts about the user into the profile.

use std::sync::Arc;

use async_trait::async_trait;
use mnema_core::{MnemaError, ProfileUpdate, StorageAdapter};
use schemars::JsonSchema;
use serde_json::{Map, Value};
use tracing::info;

use crate::schema::parameters_schema;
use crate::tool::{Tool, ToolEffect, ToolName, ToolOutput};

/// Interests given as a list or as one comma-separated string.
#[allow(dead_code)]
#[derive(JsonSchema)]
#[serde(untagged)]
enum InterestsArg {
    List(Vec<String>),
    Text(String),
}

/// The profile fields a call may set. Only used for schema generation;
/// the arguments are validated by [`ProfileUpdate::from_map`].
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ProfileFields {
    /// First name.
    name: Option<String>,
    last_name: Option<String>,
    age: Option<u32>,
    gender: Option<String>,
    /// City or country the user lives in.
    location: Option<String>,
    occupation: Option<String>,
    /// Hobbies and topics the user likes. Added to the existing ones.
    interests: Option<InterestsArg>,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct AddUserInfoArgs {
    /// Profile fields to store. Only the listed keys are accepted.
    updates: ProfileFields,
}

/// Keys under which models nest the update mapping.
const WRAPPER_KEYS: [&str; 2] = ["updates", "user_info"];

pub struct AddUserInfoTool {
    storage: Arc<dyn StorageAdapter>,
}

impl AddUserInfoTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

/// Unwraps `{"updates": {...}}`; a flat mapping is taken as the update itself.
fn update_mapping(mut arguments: Map<String, Value>) -> Map<String, Value> {
    if arguments.len() == 1 {
        for key in WRAPPER_KEYS {
            if !matches!(arguments.get(key), Some(Value::Object(_))) {
                continue;
            }
            if let Some(Value::Object(inner)) = arguments.remove(key) {
                return inner;
            }
        }
    }
    arguments
}

#[async_trait]
impl Tool for AddUserInfoTool {
    fn name(&self) -> ToolName {
        ToolName::AddUserInfo
    }

    fn description(&self) -> &str {
        "Store information the user shared about themselves (name, last name, age, gender, \
         location, occupation, interests). Interests are merged with the ones already known; \
         every other field is overwritten."
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema::<AddUserInfoArgs>()
    }

    async fn invoke(&self, arguments: Map<String, Value>) -> Result<ToolOutput, MnemaError> {
        let update = ProfileUpdate::from_map(&update_mapping(arguments))?;
        if update.is_empty() {
            return Err(MnemaError::MalformedToolArguments {
                tool: ToolName::ADD_USER_INFO.into(),
                detail: "no profile field to update".into(),
            });
        }

        let profile = self.storage.merge_profile(&update).await?;
        let mut touched: Vec<String> = update.fields.keys().map(ToString::to_string).collect();
        if !update.interests.is_empty() {
            touched.push("interests".into());
        }
        info!(fields = %touched.join(","), "user profile updated");

        Ok(ToolOutput {
            detail: format!("User information updated: {}", touched.join(", ")),
            effect: Some(ToolEffect::ProfileChanged(profile)),
        })
    }
}
