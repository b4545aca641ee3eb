//! JSON path resolution
//!
//! Locates a value inside a JSON document and renders its position as a
//! JSONPath expression. Inside arrays the position is expressed as a filter
//! (`[?(@.key == 'v')].key`) so the path keeps matching when the element
//! moves.

use crate::core::extraction::json::MAX_JSON_DEPTH;
use serde_json::Value;
use std::borrow::Cow;

const SPECIAL_KEY_CHARS: &[char] = &['.', '$', '@', '[', ']', '?', '(', ')'];

/// Key of a flattened entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    Name(String),
    /// Scalar element of an array.
    Index(usize),
}

/// One level of `(key, value)` pairs. Array elements that are objects
/// contribute their own keys; scalar elements are keyed by index.
pub fn flatten(document: &Value) -> Vec<(PathKey, &Value)> {
    match document {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (PathKey::Name(key.clone()), value))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .flat_map(|(index, item)| match item {
                Value::Object(map) => map
                    .iter()
                    .map(|(key, value)| (PathKey::Name(key.clone()), value))
                    .collect::<Vec<_>>(),
                other => vec![(PathKey::Index(index), other)],
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn nested_document(value: &Value) -> Option<Cow<'_, Value>> {
    match value {
        Value::Object(_) | Value::Array(_) => Some(Cow::Borrowed(value)),
        Value::String(text) if crate::capture::is_json_document(text) => serde_json::from_str(text.trim())
            .ok()
            .map(Cow::Owned),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text)),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains(SPECIAL_KEY_CHARS)
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn member(key: &str) -> String {
    if needs_brackets(key) {
        format!("[{}]", quote(key))
    } else {
        format!(".{key}")
    }
}

fn filter_ref(key: &str) -> String {
    if needs_brackets(key) {
        format!("@[{}]", quote(key))
    } else {
        format!("@.{key}")
    }
}

fn step(key: &PathKey, in_array: bool) -> String {
    match key {
        PathKey::Index(index) => format!("[{index}]"),
        PathKey::Name(name) if in_array => format!("[*]{}", member(name)),
        PathKey::Name(name) => member(name),
    }
}

fn leaf_step(key: &PathKey, value: &Value, text: &str, in_array: bool) -> String {
    match key {
        PathKey::Name(name) if in_array => {
            let literal = if value.is_string() {
                quote(text)
            } else {
                text.to_string()
            };
            format!("[?({} == {})]{}", filter_ref(name), literal, member(name))
        }
        _ => step(key, false),
    }
}

fn matches(text: &str, target: &str, use_contains: bool) -> bool {
    if use_contains {
        text.contains(target)
    } else {
        text == target
    }
}

fn walk(
    entries: &[(PathKey, &Value)],
    target: &str,
    use_contains: bool,
    depth: usize,
    in_array: bool,
) -> Option<String> {
    if depth > MAX_JSON_DEPTH {
        return None;
    }

    for (key, value) in entries {
        if let Some(document) = nested_document(value) {
            let children = flatten(&document);
            if let Some(rest) = walk(&children, target, use_contains, depth + 1, document.is_array()) {
                return Some(format!("{}{}", step(key, in_array), rest));
            }
            continue;
        }

        if let Some(text) = scalar_text(value) {
            if matches(&text, target, use_contains) {
                return Some(leaf_step(key, value, &text, in_array));
            }
        }
    }

    None
}

/// First path (depth-first, first child first) whose scalar equals or, with
/// `use_contains`, contains `target`; `""` when there is none.
pub fn resolve_path(document: &Value, target: &str, use_contains: bool) -> String {
    if target.is_empty() {
        return String::new();
    }
    walk(&flatten(document), target, use_contains, 0, document.is_array())
        .map(|path| format!("${path}"))
        .unwrap_or_default()
}

/// [`resolve_path`] over document text; non-JSON text resolves to `""`.
pub fn json_path_to_value(text: &str, target: &str, use_contains: bool) -> String {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(document @ (Value::Object(_) | Value::Array(_))) => {
            resolve_path(&document, target, use_contains)
        }
        _ => String::new(),
    }
}

/// Every concrete path (`$.a[0].b`) whose scalar text equals `value`, in
/// document order.
pub fn json_paths_to_value(document: &Value, value: &str) -> Vec<String> {
    concrete_paths(document, "$", value, 0)
}

fn concrete_paths(node: &Value, prefix: &str, value: &str, depth: usize) -> Vec<String> {
    if depth > MAX_JSON_DEPTH {
        return Vec::new();
    }
    match node {
        Value::Object(map) => map
            .iter()
            .flat_map(|(key, child)| concrete_paths(child, &format!("{prefix}{}", member(key)), value, depth + 1))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .flat_map(|(index, child)| concrete_paths(child, &format!("{prefix}[{index}]"), value, depth + 1))
            .collect(),
        other => match scalar_text(other) {
            Some(text) if text == value => vec![prefix.to_string()],
            _ => Vec::new(),
        },
    }
}
