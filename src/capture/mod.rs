//! Captured traffic
//!
//! Requests and responses recorded at the protocol boundary, grouped into a
//! [`Trace`]. Captures are correlated by their `label`: a request and its
//! response share one, and the same step of a workflow carries the same label
//! in a recording and in its replay.

pub mod body;
pub mod encoding;
pub mod har;
pub mod loader;

pub use body::is_json_document;
pub use encoding::{decode_value, encode_value};
pub use loader::load_trace;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const BASE_URL: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_successful() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub label: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Absolute URL or bare path (`/login?next=1`).
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HeaderField>,
    /// Explicit arguments; when empty they are parsed from `body`.
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Request {
    pub fn new(label: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            arguments: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderField::new(name, value));
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push(Argument::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Parsed URL; bare paths resolve against a placeholder host.
    pub fn parsed_url(&self) -> Option<Url> {
        let parsed = Url::parse(&self.url).or_else(|_| Url::parse(BASE_URL)?.join(&self.url));
        match parsed {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Malformed URL '{}' in {}: {}", self.url, self.label, e);
                None
            }
        }
    }

    pub fn host(&self) -> Option<String> {
        self.parsed_url()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Path without query or fragment.
    pub fn path(&self) -> String {
        self.parsed_url()
            .map(|url| url.path().to_string())
            .unwrap_or_else(|| {
                self.url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
    }

    /// Raw query string, if any.
    pub fn query(&self) -> Option<String> {
        self.parsed_url()
            .and_then(|url| url.query().map(str::to_string))
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parsed_url()
            .map(|url| {
                url.query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Explicit arguments, or arguments parsed from the body by content type.
    pub fn effective_arguments(&self) -> Vec<Argument> {
        if !self.arguments.is_empty() {
            return self.arguments.clone();
        }
        match &self.body {
            Some(body) => body::parse_arguments(body, self.content_type()),
            None => Vec::new(),
        }
    }

    /// True when the body is sent as one raw JSON document.
    pub fn is_raw_body(&self) -> bool {
        self.arguments.is_empty()
            && self
                .body
                .as_deref()
                .is_some_and(|body| body::is_raw_json_body(body, self.content_type()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub label: String,
    #[serde(default)]
    pub status: u16,
    /// Raw header block, one `Name: value` per line, status line allowed.
    #[serde(default)]
    pub headers: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_successful")]
    pub successful: bool,
    #[serde(default)]
    pub binary: bool,
}

impl Response {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: 200,
            headers: String::new(),
            body: String::new(),
            content_type: None,
            url: None,
            successful: true,
            binary: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self.successful = status < 400;
        self
    }

    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Body as text; binary payloads read as empty.
    pub fn body_text(&self) -> &str {
        if self.binary {
            ""
        } else {
            &self.body
        }
    }

    /// Header lines split into `(name, value)` on the first colon.
    pub fn header_fields(&self) -> Vec<HeaderField> {
        self.headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .filter(|(name, _)| !name.trim().is_empty() && !name.contains(' '))
            .map(|(name, value)| HeaderField::new(name.trim(), value.trim()))
            .collect()
    }

    pub fn content_type(&self) -> Option<String> {
        self.content_type.clone().or_else(|| {
            self.header_fields()
                .into_iter()
                .find(|h| h.name.eq_ignore_ascii_case("Content-Type"))
                .map(|h| h.value)
        })
    }
}

/// One captured run of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl Trace {
    pub fn new(requests: Vec<Request>, responses: Vec<Response>) -> Self {
        Self {
            requests,
            responses,
        }
    }

    pub fn push(&mut self, request: Request, response: Option<Response>) {
        self.requests.push(request);
        if let Some(response) = response {
            self.responses.push(response);
        }
    }

    pub fn request_for(&self, label: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.label == label)
    }

    pub fn response_for(&self, label: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.label == label)
    }

    pub fn failing_labels(&self) -> Vec<&str> {
        self.responses
            .iter()
            .filter(|r| !r.successful)
            .map(|r| r.label.as_str())
            .collect()
    }

    /// Sub-trace holding only the captures whose label satisfies `keep`.
    pub fn retain_labels<F>(&self, keep: F) -> Trace
    where
        F: Fn(&str) -> bool,
    {
        Trace {
            requests: self
                .requests
                .iter()
                .filter(|r| keep(&r.label))
                .cloned()
                .collect(),
            responses: self
                .responses
                .iter()
                .filter(|r| keep(&r.label))
                .cloned()
                .collect(),
        }
    }
}
