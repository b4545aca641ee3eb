//! Header, sub-parameter and Set-Cookie parsing.

use super::filter::can_be_filtered;
use super::Observation;
use crate::capture::decode_value;
use crate::config::Configuration;
use crate::core::appearance::{Side, SourceCategory};
use std::collections::BTreeMap;

pub const ENCODED_SUFFIX: &str = "_encoded";
const AUTH_SUFFIX: &str = "_auth";

/// Cookie scope attributes kept in the parameter name.
pub type CookieScope = BTreeMap<String, String>;

fn scope_key(attribute: &str) -> Option<&'static str> {
    let attribute = attribute.trim();
    if attribute.eq_ignore_ascii_case("path") {
        Some("Path")
    } else if attribute.eq_ignore_ascii_case("domain") {
        Some("Domain")
    } else {
        None
    }
}

/// `Path`/`Domain` attributes of a list of `;`-separated cookie attributes.
pub fn cookie_scope<'a, I>(attributes: I) -> CookieScope
where
    I: IntoIterator<Item = &'a str>,
{
    attributes
        .into_iter()
        .filter_map(|attribute| attribute.split_once('='))
        .filter_map(|(key, value)| scope_key(key).map(|key| (key.to_string(), value.trim().to_string())))
        .collect()
}

/// `name[Domain=x, Path=/y]`, or the bare name when unscoped.
pub fn scoped_cookie_name(name: &str, scope: &CookieScope) -> String {
    if scope.is_empty() {
        return name.to_string();
    }
    let attributes: Vec<String> = scope.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}[{}]", name, attributes.join(", "))
}

/// Inverse of [`scoped_cookie_name`]; also strips the encoded-form suffix.
pub fn split_scoped_cookie_name(name: &str) -> (String, CookieScope) {
    let name = name.strip_suffix(ENCODED_SUFFIX).unwrap_or(name);
    match name.split_once('[') {
        Some((base, rest)) if rest.ends_with(']') => {
            let inner = &rest[..rest.len() - 1];
            (base.to_string(), cookie_scope(inner.split(',')))
        }
        _ => (name.to_string(), CookieScope::new()),
    }
}

/// Observations for one header.
pub fn header_observations(name: &str, value: &str, side: Side, config: &Configuration) -> Vec<Observation> {
    let name = name.trim();
    let value = value.trim();
    if can_be_filtered(name, value, config) {
        return Vec::new();
    }

    if side == Side::Response && name.eq_ignore_ascii_case("Set-Cookie") {
        return set_cookie_observations(value, config);
    }

    if value.contains(';') && value.contains('=') {
        return sub_parameter_observations(name, value, side, config);
    }

    if name.eq_ignore_ascii_case("Authorization") {
        return authorization_observations(name, value, side);
    }

    vec![Observation::new(name, value, SourceCategory::Header(side))]
}

fn sub_parameter_observations(
    header: &str,
    value: &str,
    side: Side,
    config: &Configuration,
) -> Vec<Observation> {
    value
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| match field.split_once('=') {
            Some((key, field_value)) => (key.trim(), field_value.trim()),
            None => (header, field),
        })
        .filter(|(key, field_value)| !can_be_filtered(key, field_value, config))
        .map(|(key, field_value)| Observation::new(key, field_value, SourceCategory::HeaderFields(side)))
        .collect()
}

fn authorization_observations(name: &str, value: &str, side: Side) -> Vec<Observation> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") && side == Side::Request => {
            vec![Observation::new(name, token, SourceCategory::BearerToken)]
        }
        (Some(_), Some(token)) => vec![Observation::new(name, token, SourceCategory::Header(side))],
        _ => vec![Observation::new(name, value, SourceCategory::Header(side))],
    }
}

/// `Set-Cookie: name=value; Path=/x; ...`
///
/// The decoded value is stored under the scoped name and the raw value
/// under the scoped name plus `_encoded`.
pub fn set_cookie_observations(header_value: &str, config: &Configuration) -> Vec<Observation> {
    let mut fields = header_value.split(';');
    let Some((name, raw_value)) = fields.next().and_then(|first| first.split_once('=')) else {
        return Vec::new();
    };
    let (name, raw_value) = (name.trim(), raw_value.trim());
    if name.is_empty() || can_be_filtered(name, raw_value, config) {
        return Vec::new();
    }

    let scoped = scoped_cookie_name(name, &cookie_scope(fields));
    let decoded = decode_value(raw_value);

    let mut observations = vec![
        Observation::new(&scoped, &decoded, SourceCategory::Cookie),
        Observation::new(format!("{scoped}{ENCODED_SUFFIX}"), raw_value, SourceCategory::Cookie),
    ];

    if name.to_ascii_lowercase().contains("authorization") && raw_value.contains("OAuth") {
        let stripped = |text: &str| text.replace("OAuth", "").trim().to_string();
        observations.push(Observation::new(
            format!("{scoped}{AUTH_SUFFIX}"),
            stripped(&decoded),
            SourceCategory::Cookie,
        ));
        observations.push(Observation::new(
            format!("{scoped}{AUTH_SUFFIX}{ENCODED_SUFFIX}"),
            stripped(raw_value),
            SourceCategory::Cookie,
        ));
    }

    observations
}
