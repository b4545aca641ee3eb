//! Request arguments, REST path segments and URL query parameters.

use super::filter::{can_be_filtered, is_parameterized};
use super::json::walk_json;
use super::Observation;
use crate::capture::{body, is_json_document, Request};
use crate::config::Configuration;
use crate::core::appearance::{Side, SourceCategory};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

pub fn argument_observations(request: &Request, config: &Configuration) -> Vec<Observation> {
    let raw_body = request.is_raw_body();
    let mut observations = Vec::new();

    for argument in request.effective_arguments() {
        if can_be_filtered(&argument.name, &argument.value, config) {
            continue;
        }

        if is_json_document(&argument.value) {
            match serde_json::from_str::<Value>(argument.value.trim()) {
                Ok(Value::Array(_)) if argument.name.is_empty() => {
                    warn!("JSON array body in {} is not supported, skipping", request.label);
                }
                Ok(document) => observations.extend(
                    walk_json(&document, Side::Request, config)
                        .into_iter()
                        .map(|leaf| Observation::new(leaf.key, leaf.value, leaf.category)),
                ),
                Err(e) => debug!("Unparseable JSON argument in {}: {}", request.label, e),
            }
            continue;
        }

        if is_parameterized(&argument.value) {
            warn!(
                "Argument '{}' in {} is already parameterized with '{}'",
                argument.name, request.label, argument.value
            );
            continue;
        }

        if raw_body {
            debug!("Body of {} is not valid JSON, reading it as raw text", request.label);
            observations.extend(
                body::parse_arguments(&argument.value, None)
                    .into_iter()
                    .filter(|pair| !can_be_filtered(&pair.name, &pair.value, config))
                    .map(|pair| Observation::new(pair.name, pair.value, SourceCategory::RawBody)),
            );
            continue;
        }

        observations.push(Observation::new(
            argument.name,
            argument.value,
            SourceCategory::Arguments,
        ));
    }

    observations
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// `/resource/{id}`: the last two segments, a name followed by a number.
pub fn path_observations(request: &Request, config: &Configuration) -> Vec<Observation> {
    let Some(url) = request.parsed_url() else {
        warn!("Skipping path extraction for {}: malformed URL", request.label);
        return Vec::new();
    };

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    let [.., resource, id] = segments.as_slice() else {
        return Vec::new();
    };

    if is_numeric(resource) || !is_numeric(id) || can_be_filtered(resource, id, config) {
        return Vec::new();
    }
    vec![Observation::new(*resource, *id, SourceCategory::RequestPath)]
}

/// First value of every query parameter.
pub fn query_observations(request: &Request, config: &Configuration) -> Vec<Observation> {
    if request.parsed_url().is_none() {
        warn!("Skipping query extraction for {}: malformed URL", request.label);
        return Vec::new();
    }

    let mut seen = HashSet::new();
    request
        .query_pairs()
        .into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .filter(|(name, value)| !can_be_filtered(name, value, config))
        .map(|(name, value)| Observation::new(name, value, SourceCategory::UrlQuery))
        .collect()
}
