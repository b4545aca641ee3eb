//! Key/value and capture filtering applied before anything is recorded.

use crate::capture::{Request, Response};
use crate::config::Configuration;
use once_cell::sync::Lazy;
use regex::Regex;

static PARAMETERIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^}]*#[^}]*\}").expect("Valid regex pattern"));

fn is_boolean_text(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// True when a key/value pair must not be tracked.
pub fn can_be_filtered(key: &str, value: &str, config: &Configuration) -> bool {
    value.is_empty()
        || config.is_ignored_parameter(key)
        || config.is_ignored_header(key)
        || (config.ignore_boolean_values && is_boolean_text(value))
}

/// A value that already references a correlation variable (`${name#0}`).
pub fn is_parameterized(value: &str) -> bool {
    PARAMETERIZED.is_match(value)
}

pub fn skip_request(request: &Request, config: &Configuration) -> bool {
    request
        .host()
        .is_some_and(|host| config.is_ignored_domain(&host))
        || config.is_ignored_file(&request.path())
}

/// Responses are judged by their own URL when known, else by the request
/// that produced them, and by content type.
pub fn skip_response(response: &Response, request: Option<&Request>, config: &Configuration) -> bool {
    let by_location = match (&response.url, request) {
        (Some(url), _) => {
            let probe = Request::new(&response.label, "GET", url.as_str());
            skip_request(&probe, config)
        }
        (None, Some(request)) => skip_request(request, config),
        (None, None) => false,
    };
    by_location
        || response
            .content_type()
            .is_some_and(|ct| config.is_ignored_content_type(&ct))
}
