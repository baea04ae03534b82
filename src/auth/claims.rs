// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Dotted-path claim extraction and reconstruction.
//!
//! Identity providers place role information at deployment-specific locations
//! inside the token claims (e.g. `realm_access.roles` or a custom `policy`
//! claim). The session issuer reads the configured claim with [`extract_claim`]
//! and re-embeds it into the internal session payload at the same logical
//! location with [`reconstruct_claim`], so downstream consumers see the claim
//! exactly where the provider put it.

use serde_json::{Map, Value};

/// Walk `data` along a `.`-separated key path.
///
/// Returns `None` if any intermediate value is not a JSON object or a key is
/// missing. Absence is a normal result, never an error.
pub fn extract_claim<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut value = data;
    for key in path.split('.') {
        value = value.as_object()?.get(key)?;
    }
    Some(value)
}

/// Rebuild a single-branch nested object whose leaf is the value at `path`.
///
/// The value is looked up with [`extract_claim`]; an absent value becomes JSON
/// null. Walking the path keys from last to first inverts the extraction, so
/// `extract_claim(&reconstruct_claim(data, path), path)` yields the same value
/// that `extract_claim(data, path)` does. A path without dots degenerates to
/// `{path: value}`.
pub fn reconstruct_claim(data: &Value, path: &str) -> Value {
    let leaf = extract_claim(data, path).cloned().unwrap_or(Value::Null);

    path.split('.').rev().fold(leaf, |inner, key| {
        let mut branch = Map::new();
        branch.insert(key.to_string(), inner);
        Value::Object(branch)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_walks_nested_path() {
        let data = json!({"a": {"b": {"c": "v"}}});
        assert_eq!(extract_claim(&data, "a.b.c"), Some(&json!("v")));
    }

    #[test]
    fn extract_returns_intermediate_objects() {
        let data = json!({"realm_access": {"roles": ["admin", "user"]}});
        assert_eq!(
            extract_claim(&data, "realm_access.roles"),
            Some(&json!(["admin", "user"]))
        );
        assert_eq!(
            extract_claim(&data, "realm_access"),
            Some(&json!({"roles": ["admin", "user"]}))
        );
    }

    #[test]
    fn extract_missing_key_is_none() {
        let data = json!({"a": {"b": 1}});
        assert_eq!(extract_claim(&data, "a.c"), None);
        assert_eq!(extract_claim(&data, "x.y"), None);
    }

    #[test]
    fn extract_non_object_intermediate_is_none() {
        let data = json!({"a": "x"});
        assert_eq!(extract_claim(&data, "a.b"), None);
    }

    #[test]
    fn reconstruct_rebuilds_nested_branch() {
        let data = json!({"a": {"b": {"c": "v"}}, "other": 1});
        let rebuilt = reconstruct_claim(&data, "a.b.c");
        assert_eq!(rebuilt, json!({"a": {"b": {"c": "v"}}}));
    }

    #[test]
    fn reconstruct_single_key_path() {
        let data = json!({"policy": ["readwrite"]});
        let rebuilt = reconstruct_claim(&data, "policy");
        assert_eq!(rebuilt, json!({"policy": ["readwrite"]}));
    }

    #[test]
    fn reconstruct_absent_value_is_null_leaf() {
        let data = json!({"a": 1});
        let rebuilt = reconstruct_claim(&data, "x.y");
        assert_eq!(rebuilt, json!({"x": {"y": null}}));
    }

    #[test]
    fn round_trip_preserves_extracted_value() {
        let data = json!({"realm_access": {"roles": ["admin"]}, "sub": "u1"});
        let path = "realm_access.roles";
        let rebuilt = reconstruct_claim(&data, path);
        assert_eq!(extract_claim(&rebuilt, path), extract_claim(&data, path));
    }
}
