//! Request body parsing by content type.

use super::encoding::parse_pairs;
use super::Argument;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MULTIPART_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)content-disposition:[^\n]*\bname="([^"]*)""#).expect("Valid regex pattern")
});

static MULTIPART_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)boundary="?([^";]+)"?"#).expect("Valid regex pattern"));

/// True when `text` parses as a JSON object or array.
pub fn is_json_document(text: &str) -> bool {
    let trimmed = text.trim();
    let looks_like = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    looks_like && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}

fn has_media_type(content_type: Option<&str>, needle: &str) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains(needle))
}

/// A body declared as JSON, or an untyped body that parses as JSON.
pub(crate) fn is_raw_json_body(body: &str, content_type: Option<&str>) -> bool {
    has_media_type(content_type, "json") || (content_type.is_none() && is_json_document(body))
}

/// Split a request body into arguments according to its content type.
///
/// A JSON body becomes a single unnamed argument carrying the whole
/// document; form and multipart bodies yield one argument per field.
pub fn parse_arguments(body: &str, content_type: Option<&str>) -> Vec<Argument> {
    if body.is_empty() {
        return Vec::new();
    }

    if has_media_type(content_type, "multipart/form-data") {
        return parse_multipart(body, content_type.unwrap_or_default());
    }

    if has_media_type(content_type, "application/x-www-form-urlencoded") {
        return parse_pairs(body)
            .into_iter()
            .map(|(name, value)| Argument::new(name, value))
            .collect();
    }

    if is_raw_json_body(body, content_type) {
        return vec![Argument::new("", body)];
    }

    parse_query_like(body)
}

/// `a=b&c=d`, keeping only fields with exactly one `=`.
fn parse_query_like(body: &str) -> Vec<Argument> {
    body.split('&')
        .filter(|field| field.matches('=').count() == 1)
        .filter_map(|field| field.split_once('='))
        .map(|(name, value)| Argument::new(name, value))
        .collect()
}

fn parse_multipart(body: &str, content_type: &str) -> Vec<Argument> {
    let Some(boundary) = MULTIPART_BOUNDARY
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    else {
        debug!("Multipart body without boundary, skipping");
        return Vec::new();
    };

    let delimiter = format!("--{boundary}");
    body.split(delimiter.as_str())
        .filter_map(|part| {
            let name = MULTIPART_NAME.captures(part)?.get(1)?.as_str().to_string();
            let value = part
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.trim().is_empty() && line.trim() != "--")
                .last()?
                .to_string();
            if value.to_ascii_lowercase().starts_with("content-") {
                return None;
            }
            Some(Argument::new(name, value))
        })
        .collect()
}
