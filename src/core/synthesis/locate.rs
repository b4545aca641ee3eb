//! Finding a value inside a response.

use super::cookie::set_cookie_lines;
use crate::capture::{encode_value, Response};
use crate::core::suggestion::LocationType;

/// Precedence when a value shows up in several places.
pub const SEARCH_ORDER: [LocationType; 3] = [LocationType::Header, LocationType::Body, LocationType::Cookie];

/// The searchable texts of one response.
#[derive(Debug, Clone)]
pub struct ResponseView<'r> {
    pub label: &'r str,
    /// The raw header block.
    pub headers: &'r str,
    /// Header block with `Set-Cookie` lines blanked, line breaks kept.
    pub headers_without_cookies: String,
    pub cookie_lines: Vec<&'r str>,
    pub body: &'r str,
}

impl<'r> ResponseView<'r> {
    pub fn new(response: &'r Response) -> Self {
        let cookie_lines = set_cookie_lines(&response.headers);
        let headers_without_cookies = response
            .headers
            .lines()
            .map(|line| if cookie_lines.contains(&line) { "" } else { line })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            label: &response.label,
            headers: &response.headers,
            headers_without_cookies,
            cookie_lines,
            body: response.body_text(),
        }
    }

    /// Text a location is searched and contextualized in.
    pub fn text(&self, kind: LocationType) -> &str {
        match kind {
            LocationType::Header => &self.headers_without_cookies,
            LocationType::Body => self.body,
            LocationType::Cookie => self.headers,
        }
    }

    fn contains(&self, kind: LocationType, needle: &str) -> bool {
        match kind {
            LocationType::Cookie => self.cookie_lines.iter().any(|line| line.contains(needle)),
            other => self.text(other).contains(needle),
        }
    }
}

/// Where a value was found and which form of it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub kind: LocationType,
    /// The URL-encoded form matched rather than the raw value.
    pub encoded: bool,
    /// The literal text that matched.
    pub value: String,
}

/// First location holding `value` or its encoded form, in [`SEARCH_ORDER`].
pub fn locate(view: &ResponseView<'_>, value: &str) -> Option<Location> {
    if value.is_empty() {
        return None;
    }
    let encoded = encode_value(value);
    let mut forms = vec![(value, false)];
    if encoded != value {
        forms.push((encoded.as_str(), true));
    }

    SEARCH_ORDER.iter().find_map(|&kind| {
        forms
            .iter()
            .find(|(form, _)| view.contains(kind, form))
            .map(|&(form, encoded)| Location {
                kind,
                encoded,
                value: form.to_string(),
            })
    })
}
