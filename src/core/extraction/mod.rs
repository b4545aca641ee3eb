//! Appearance extraction
//!
//! Walks captures and builds a [`ParameterTrace`]. Parsing helpers in the
//! submodules are pure and return [`Observation`]s; the extractor applies
//! the shared filters and records them against the capture they came from.
//!
//! Two flavors exist:
//! - [`AppearanceExtractor::extract_requests`] reads only what a recorded
//!   script sends: arguments, REST path, URL query and bearer tokens.
//! - [`AppearanceExtractor::extract_trace`] reads full traffic: every request
//!   header, response headers including Set-Cookie, and JSON response bodies.

pub mod filter;
pub mod headers;
pub mod json;
pub mod request;

use crate::capture::{is_json_document, Request, Response, Trace};
use crate::config::Configuration;
use crate::core::appearance::{Appearance, ParameterTrace, Side, SourceCategory, UsageRef};
use serde_json::Value;
use tracing::{debug, trace};

pub use filter::{can_be_filtered, is_parameterized};

pub const RECORDING_ORIGIN: &str = "recording";
pub const REPLAY_ORIGIN: &str = "replay";

/// A name/value pair found by one of the parsers, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub name: String,
    pub value: String,
    pub source: SourceCategory,
}

impl Observation {
    pub fn new(name: impl Into<String>, value: impl Into<String>, source: SourceCategory) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source,
        }
    }
}

pub struct AppearanceExtractor<'a> {
    config: &'a Configuration,
    origin: String,
}

impl<'a> AppearanceExtractor<'a> {
    pub fn new(config: &'a Configuration, origin: impl Into<String>) -> Self {
        Self {
            config,
            origin: origin.into(),
        }
    }

    /// Recording flavor: what the requests send.
    pub fn extract_requests(&self, requests: &[Request]) -> ParameterTrace {
        let mut parameters = ParameterTrace::new();
        for request in requests {
            if filter::skip_request(request, self.config) {
                trace!("Ignoring request {}", request.label);
                continue;
            }
            let mut observations = self.sent_values(request);
            observations.extend(bearer_observations(request));
            self.record_all(&mut parameters, observations, usage_of(request));
        }
        parameters
    }

    /// Full-traffic flavor: requests with all their headers plus responses.
    pub fn extract_trace(&self, trace: &Trace) -> ParameterTrace {
        let mut parameters = ParameterTrace::new();

        for request in &trace.requests {
            if filter::skip_request(request, self.config) {
                trace!("Ignoring request {}", request.label);
                continue;
            }
            let mut observations = self.sent_values(request);
            for header in &request.headers {
                observations.extend(headers::header_observations(
                    &header.name,
                    &header.value,
                    Side::Request,
                    self.config,
                ));
            }
            self.record_all(&mut parameters, observations, usage_of(request));
        }

        for response in &trace.responses {
            let request = trace.request_for(&response.label);
            if filter::skip_response(response, request, self.config) {
                trace!("Ignoring response {}", response.label);
                continue;
            }
            let usage = match request {
                Some(request) => usage_of(request),
                None => UsageRef::new(&response.label, "", response.url.clone().unwrap_or_default()),
            };
            let observations = self.received_values(response);
            self.record_all(&mut parameters, observations, usage);
        }

        parameters
    }

    fn sent_values(&self, request: &Request) -> Vec<Observation> {
        let mut observations = request::argument_observations(request, self.config);
        observations.extend(request::path_observations(request, self.config));
        observations.extend(request::query_observations(request, self.config));
        observations
    }

    fn received_values(&self, response: &Response) -> Vec<Observation> {
        let mut observations: Vec<Observation> = response
            .header_fields()
            .iter()
            .flat_map(|h| headers::header_observations(&h.name, &h.value, Side::Response, self.config))
            .collect();

        let body = response.body_text();
        let declared_json = response
            .content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if is_json_document(body) {
            match serde_json::from_str::<Value>(body.trim()) {
                Ok(document) => observations.extend(
                    json::walk_json(&document, Side::Response, self.config)
                        .into_iter()
                        .map(|leaf| Observation::new(leaf.key, leaf.value, leaf.category)),
                ),
                Err(e) => debug!("Response {} body is not JSON: {}", response.label, e),
            }
        } else if declared_json && !body.is_empty() {
            debug!("Response {} declares JSON but is not parseable, treating as raw text", response.label);
        }

        observations
    }

    fn record_all(&self, parameters: &mut ParameterTrace, observations: Vec<Observation>, usage: UsageRef) {
        for observation in observations {
            self.record(parameters, observation, &usage);
        }
    }

    fn record(&self, parameters: &mut ParameterTrace, observation: Observation, usage: &UsageRef) {
        let name = observation.name.trim();
        if name.is_empty() {
            trace!("Unnamed value '{}' in {} skipped", observation.value, usage.label);
            return;
        }
        if can_be_filtered(name, &observation.value, self.config) {
            return;
        }
        if observation.value.chars().count() < self.config.min_value_length {
            return;
        }
        parameters.record(Appearance::new(
            name,
            observation.value,
            observation.source,
            usage.clone(),
            self.origin.clone(),
        ));
    }
}

fn usage_of(request: &Request) -> UsageRef {
    UsageRef::new(&request.label, &request.method, request.path())
}

fn bearer_observations(request: &Request) -> Vec<Observation> {
    request
        .headers
        .iter()
        .filter(|h| h.name.eq_ignore_ascii_case("Authorization"))
        .filter_map(|h| {
            let mut parts = h.value.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") => {
                    Some(Observation::new(h.name.trim(), token, SourceCategory::BearerToken))
                }
                _ => None,
            }
        })
        .collect()
}

/// Recording flavor over `requests`.
pub fn extract_requests(requests: &[Request], config: &Configuration) -> ParameterTrace {
    AppearanceExtractor::new(config, RECORDING_ORIGIN).extract_requests(requests)
}

/// Full-traffic flavor over `trace`.
pub fn extract_trace(trace: &Trace, config: &Configuration) -> ParameterTrace {
    AppearanceExtractor::new(config, REPLAY_ORIGIN).extract_trace(trace)
}

/// `extract(captures, config)`: the full-traffic flavor.
pub fn extract(trace: &Trace, config: &Configuration) -> ParameterTrace {
    extract_trace(trace, config)
}
