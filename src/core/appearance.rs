//! Observed parameter values and the per-trace map that collects them.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Which half of an exchange a value was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Side {
    Request,
    Response,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Request => write!(f, "Request"),
            Side::Response => write!(f, "Response"),
        }
    }
}

/// Where a value was found. Every synthesis decision matches on this
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceCategory {
    /// `?name=value` in the request URL.
    UrlQuery,
    /// `/resource/{id}` REST segment.
    RequestPath,
    /// Form, multipart or explicit request argument.
    Arguments,
    /// A request body sent as one raw document that is not JSON-walkable.
    RawBody,
    /// Token of an `Authorization: Bearer` header.
    BearerToken,
    /// A whole header value.
    Header(Side),
    /// One `;`-separated sub-parameter of a header value.
    HeaderFields(Side),
    /// A `Set-Cookie` name/value pair.
    Cookie,
    JsonBody(Side),
    JsonBodyNumeric(Side),
    /// Scalar element of a JSON array.
    JsonBodyArray(Side),
}

impl SourceCategory {
    pub fn side(&self) -> Side {
        match self {
            SourceCategory::UrlQuery
            | SourceCategory::RequestPath
            | SourceCategory::Arguments
            | SourceCategory::RawBody
            | SourceCategory::BearerToken => Side::Request,
            SourceCategory::Cookie => Side::Response,
            SourceCategory::Header(side)
            | SourceCategory::HeaderFields(side)
            | SourceCategory::JsonBody(side)
            | SourceCategory::JsonBodyNumeric(side)
            | SourceCategory::JsonBodyArray(side) => *side,
        }
    }

    pub fn is_response(&self) -> bool {
        self.side() == Side::Response
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCategory::UrlQuery => write!(f, "Request Query"),
            SourceCategory::RequestPath => write!(f, "Request Path"),
            SourceCategory::Arguments => write!(f, "HTTP arguments"),
            SourceCategory::RawBody => write!(f, "Body Data"),
            SourceCategory::BearerToken => write!(f, "Bearer"),
            SourceCategory::Header(side) => write!(f, "Header {side} (Fields)"),
            SourceCategory::HeaderFields(side) => write!(f, "Header {side} (Sub-Parameters)"),
            SourceCategory::Cookie => write!(f, "Header Response (Set-Cookie)"),
            SourceCategory::JsonBody(side) => write!(f, "{side} Body JSON"),
            SourceCategory::JsonBodyNumeric(side) => write!(f, "{side} Body JSON (Numeric)"),
            SourceCategory::JsonBodyArray(side) => write!(f, "{side} Body JSON (Array)"),
        }
    }
}

impl Serialize for SourceCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A capture a value was seen in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UsageRef {
    pub label: String,
    pub method: String,
    pub path: String,
}

impl UsageRef {
    pub fn new(label: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            method: method.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appearance {
    pub name: String,
    pub value: String,
    pub source: SourceCategory,
    pub usages: Vec<UsageRef>,
    /// Label of the trace this was extracted from (`recording`, `replay`, ...).
    pub origin: String,
}

impl Appearance {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        source: SourceCategory,
        usage: UsageRef,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source,
            usages: vec![usage],
            origin: origin.into(),
        }
    }

    /// Canonical `source:value` key used to compare appearance sets.
    pub fn comparison_key(&self) -> String {
        format!("{}:{}", self.source, self.value)
    }

    pub fn is_used_by(&self, label: &str) -> bool {
        self.usages.iter().any(|usage| usage.label == label)
    }
}

/// Outcome of recording one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Added,
    Appended,
    Duplicate,
}

/// `parameter name -> [Appearance]` for one capture set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterTrace {
    parameters: BTreeMap<String, Vec<Appearance>>,
}

impl ParameterTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Appearance]> {
        self.parameters.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Appearance])> {
        self.parameters
            .iter()
            .map(|(name, appearances)| (name.as_str(), appearances.as_slice()))
    }

    /// New trace with only the parameters accepted by `keep`.
    pub fn filtered<F>(&self, keep: F) -> ParameterTrace
    where
        F: Fn(&str, &[Appearance]) -> bool,
    {
        ParameterTrace {
            parameters: self
                .parameters
                .iter()
                .filter(|(name, appearances)| keep(name, appearances))
                .map(|(name, appearances)| (name.clone(), appearances.clone()))
                .collect(),
        }
    }

    /// Record an observation.
    ///
    /// A value already seen with the same source gains the usage; the same
    /// value seen again by the same capture is dropped.
    pub fn record(&mut self, appearance: Appearance) -> RecordOutcome {
        let entry = self
            .parameters
            .entry(appearance.name.clone())
            .or_default();

        let labels: Vec<String> = appearance.usages.iter().map(|u| u.label.clone()).collect();
        for existing in entry.iter_mut().filter(|a| a.value == appearance.value) {
            if let Some(label) = labels.iter().find(|label| existing.is_used_by(label)) {
                debug!(
                    "Value '{}' for '{}' already recorded for {}",
                    appearance.value, appearance.name, label
                );
                return RecordOutcome::Duplicate;
            }
            if existing.source == appearance.source {
                existing.usages.extend(appearance.usages);
                return RecordOutcome::Appended;
            }
        }

        entry.push(appearance);
        RecordOutcome::Added
    }
}

impl FromIterator<Appearance> for ParameterTrace {
    fn from_iter<I: IntoIterator<Item = Appearance>>(iter: I) -> Self {
        let mut trace = ParameterTrace::new();
        for appearance in iter {
            trace.record(appearance);
        }
        trace
    }
}
