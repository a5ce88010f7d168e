// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON Schema generation for tool arguments.

use schemars::JsonSchema;

/// Generates the parameters schema of `T` in the shape function-calling
/// APIs expect: a bare object schema without the `$schema` marker.
pub fn parameters_schema<T: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Args {
        /// What to look for.
        query: String,
        limit: Option<u32>,
    }

    #[test]
    fn strips_meta_keys() {
        let schema = parameters_schema::<Args>();
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["description"], "What to look for.");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }
}
