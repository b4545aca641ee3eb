//! JSON document walking.
//!
//! The walk is pure: it returns every scalar leaf with the key it sits
//! under and lets the caller decide what to record.

use crate::capture::is_json_document;
use crate::config::Configuration;
use crate::core::appearance::{Side, SourceCategory};
use serde_json::{Map, Value};
use tracing::debug;

/// Nesting beyond this depth is ignored.
pub const MAX_JSON_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLeaf {
    pub key: String,
    pub value: String,
    pub category: SourceCategory,
    pub depth: usize,
}

/// Parse a string that itself holds a JSON object or array.
fn embedded_document(text: &str) -> Option<Value> {
    if !is_json_document(text) {
        return None;
    }
    serde_json::from_str(text.trim()).ok()
}

/// Collect the scalar leaves of `document`.
pub fn walk_json(document: &Value, side: Side, config: &Configuration) -> Vec<JsonLeaf> {
    match document {
        Value::Object(map) => walk_object(map, side, config, 0),
        Value::Array(items) => walk_array("", items, side, config, 0),
        _ => Vec::new(),
    }
}

fn walk_object(map: &Map<String, Value>, side: Side, config: &Configuration, depth: usize) -> Vec<JsonLeaf> {
    if depth > MAX_JSON_DEPTH {
        debug!("JSON nesting deeper than {} ignored", MAX_JSON_DEPTH);
        return Vec::new();
    }
    map.iter()
        .flat_map(|(key, value)| walk_entry(key, value, side, config, depth))
        .collect()
}

fn walk_entry(key: &str, value: &Value, side: Side, config: &Configuration, depth: usize) -> Vec<JsonLeaf> {
    let leaf = |text: String, category: SourceCategory| {
        vec![JsonLeaf {
            key: key.to_string(),
            value: text,
            category,
            depth,
        }]
    };

    match value {
        Value::Null => {
            debug!("Null value for '{}' skipped", key);
            Vec::new()
        }
        Value::Bool(flag) if !config.ignore_boolean_values => {
            leaf(flag.to_string(), SourceCategory::JsonBody(side))
        }
        Value::Bool(_) => Vec::new(),
        Value::Number(number) => leaf(number.to_string(), SourceCategory::JsonBodyNumeric(side)),
        Value::String(text) => match embedded_document(text) {
            Some(Value::Object(map)) => walk_object(&map, side, config, depth + 1),
            Some(Value::Array(items)) => walk_array(key, &items, side, config, depth + 1),
            _ => leaf(text.clone(), SourceCategory::JsonBody(side)),
        },
        Value::Object(map) => walk_object(map, side, config, depth + 1),
        Value::Array(items) => walk_array(key, items, side, config, depth + 1),
    }
}

/// Array scalars are recorded under the array's own key.
fn walk_array(key: &str, items: &[Value], side: Side, config: &Configuration, depth: usize) -> Vec<JsonLeaf> {
    if depth > MAX_JSON_DEPTH {
        debug!("JSON nesting deeper than {} ignored", MAX_JSON_DEPTH);
        return Vec::new();
    }

    let scalar = |text: String| JsonLeaf {
        key: key.to_string(),
        value: text,
        category: SourceCategory::JsonBodyArray(side),
        depth,
    };

    let mut leaves = Vec::new();
    for item in items {
        match item {
            Value::Object(map) => leaves.extend(walk_object(map, side, config, depth + 1)),
            Value::Array(nested) => leaves.extend(walk_array(key, nested, side, config, depth + 1)),
            Value::String(text) => match embedded_document(text) {
                Some(Value::Object(map)) => leaves.extend(walk_object(&map, side, config, depth + 1)),
                Some(Value::Array(nested)) => {
                    leaves.extend(walk_array(key, &nested, side, config, depth + 1))
                }
                _ => leaves.push(scalar(text.clone())),
            },
            Value::Number(number) => leaves.push(scalar(number.to_string())),
            Value::Bool(flag) if !config.ignore_boolean_values => leaves.push(scalar(flag.to_string())),
            Value::Bool(_) | Value::Null => {}
        }
    }
    leaves
}
