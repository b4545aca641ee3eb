//! Correlation engine configuration
//!
//! Thresholds, ignore-lists and diff acceptance policy. The value object is
//! loaded once by the shell (see [`loader`]) and handed to the engine by
//! reference; it changes only through the explicit setters below.

pub mod loader;

#[cfg(test)]
mod tests;

pub use loader::ConfigLoader;

use crate::error::{CorrelationError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

pub const DEFAULT_MIN_VALUE_LENGTH: usize = 2;
pub const DEFAULT_CONTEXT_LENGTH: usize = 10;
pub const DEFAULT_MAX_NUMBER_OF_APPEARANCES: i64 = 500;
/// Sentinel for `max_number_of_appearances` disabling the cap.
pub const UNBOUNDED_APPEARANCES: i64 = -1;

const ENV_PREFIX: &str = "AUTOCORRELATE_";

const DEFAULT_IGNORED_DOMAINS: &[&str] = &[
    "mozilla.org",
    "mozilla.net",
    "mozilla.com",
    "content-signature-2.cdn.mozilla.net",
    "push.services.mozilla.com",
    "classify-client.services.mozilla.com",
    "1aus5.mozilla.org",
];

const DEFAULT_IGNORED_HEADERS: &[&str] = &[
    "Referer",
    "Allow",
    "Origin",
    "Host",
    "User-Agent",
    "If-Modified-Since",
    "Content-Length",
    "Location",
    "Accept-Ranges",
    "X-Pingback",
    "Timing-Allow-Origin",
    "Accept-Encoding",
    "Connection",
    "Accept",
    "Accept-Language",
    "Cache-Control",
    "Pragma",
    "Upgrade-Insecure-Requests",
    "vary",
    "Server",
    "X-Frame-Options",
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Methods",
    "Last-Modified",
    "X-HTTP-Method-Override",
    "X-Content-Type-Options",
    "X-Robots-Tag",
    "Referrer-Policy",
    "Content-Type",
    "Content-Encoding",
    "Content-Disposition",
    "Access-Control-Allow-Headers",
    "Access-Control-Expose-Headers",
    "X-Requested-With",
    "Transfer-Encoding",
    "X-Redirect-By",
    "Content-Security-Policy",
    "Strict-Transport-Security",
    "max-age",
    "max-stale",
    "min-fresh",
    "no-cache",
    "no-store",
    "no-transform",
    "only-if-cached",
    "stale-if-error",
    "Sec-CH-UA-Mobile",
    "Sec-Fetch-Mode",
    "Sec-Fetch-Site",
    "Sec-Fetch-User",
    "Sec-Fetch-Dest",
    "CF-ray",
    "X-nc",
    "X-XSS-Protection",
    "Content-Security-Policy-Report-Only",
];

const DEFAULT_IGNORED_FILES: &[&str] = &[
    "jpg", "jpeg", "png", "css", "js", "woff", "txt", "svg", "ico", "pdf", "zip", "gzip", "tar",
    "gz", "rar", "7z", "exe", "msi", "woff2",
];

const DEFAULT_IGNORED_PARAMETERS: &[&str] = &[
    "log",
    "pwd",
    "password",
    "pass",
    "passwd",
    "action",
    "testcookie",
    "ver",
    "widget",
    "d",
    "r",
    "s",
    "ipv6",
    "ipv4",
    "remind_me_later",
    "redirect_to",
    "pagenow",
    "if-modified-since",
    "url",
    "redirect",
    "redirect_uri",
    "host",
    "expires",
    "date",
    "as",
    "rel",
    "link",
    "returl",
    "dur",
    "vary",
    "connection",
];

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Engine configuration with the defaults of the recording tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Values shorter than this are never tracked.
    pub min_value_length: usize,
    /// Characters kept on each side of a located value.
    pub context_length: usize,
    /// Per-parameter appearance cap; `-1` disables it.
    pub max_number_of_appearances: i64,
    /// Drop literal `true`/`false` values.
    pub ignore_boolean_values: bool,
    pub ignored_domains: Vec<String>,
    pub ignored_headers: Vec<String>,
    /// File extensions (without the dot) whose captures are skipped.
    pub ignored_files: Vec<String>,
    pub ignored_parameters: Vec<String>,
    /// Parameters always reported as candidates, whatever the diff says.
    pub requested_parameters: Vec<String>,
    pub accept_original_orphans: bool,
    pub accept_replay_orphans: bool,
    pub accept_equal_appearances: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            min_value_length: DEFAULT_MIN_VALUE_LENGTH,
            context_length: DEFAULT_CONTEXT_LENGTH,
            max_number_of_appearances: DEFAULT_MAX_NUMBER_OF_APPEARANCES,
            ignore_boolean_values: true,
            ignored_domains: to_owned_list(DEFAULT_IGNORED_DOMAINS),
            ignored_headers: to_owned_list(DEFAULT_IGNORED_HEADERS),
            ignored_files: to_owned_list(DEFAULT_IGNORED_FILES),
            ignored_parameters: to_owned_list(DEFAULT_IGNORED_PARAMETERS),
            requested_parameters: Vec::new(),
            accept_original_orphans: false,
            accept_replay_orphans: false,
            accept_equal_appearances: false,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// The appearance cap, or `None` when unbounded.
    pub fn appearance_limit(&self) -> Option<usize> {
        usize::try_from(self.max_number_of_appearances).ok()
    }

    /// True when `count` appearances exceed the configured cap.
    pub fn exceeds_appearance_limit(&self, count: usize) -> bool {
        self.appearance_limit().is_some_and(|limit| count > limit)
    }

    pub fn set_min_value_length(&mut self, length: usize) {
        self.min_value_length = length;
    }

    pub fn set_context_length(&mut self, length: usize) {
        self.context_length = length;
    }

    pub fn set_max_number_of_appearances(&mut self, max: i64) {
        self.max_number_of_appearances = max;
    }

    pub fn set_ignore_boolean_values(&mut self, ignore: bool) {
        self.ignore_boolean_values = ignore;
    }

    pub fn set_ignored_files(&mut self, files: Vec<String>) {
        self.ignored_files = files;
    }

    pub fn set_ignored_parameters(&mut self, parameters: Vec<String>) {
        self.ignored_parameters = parameters;
    }

    pub fn add_ignored_parameters<I, S>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_parameters
            .extend(parameters.into_iter().map(Into::into));
    }

    pub fn add_requested_parameters<I, S>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for parameter in parameters.into_iter().map(Into::into) {
            if !self.requested_parameters.contains(&parameter) {
                self.requested_parameters.push(parameter);
            }
        }
    }

    pub fn with_accept_original_orphans(mut self, accept: bool) -> Self {
        self.accept_original_orphans = accept;
        self
    }

    pub fn with_accept_replay_orphans(mut self, accept: bool) -> Self {
        self.accept_replay_orphans = accept;
        self
    }

    pub fn with_accept_equal_appearances(mut self, accept: bool) -> Self {
        self.accept_equal_appearances = accept;
        self
    }

    pub fn is_requested(&self, name: &str) -> bool {
        self.requested_parameters.iter().any(|p| p == name)
    }

    pub fn is_ignored_parameter(&self, key: &str) -> bool {
        let key = key.trim();
        self.ignored_parameters
            .iter()
            .any(|p| p.eq_ignore_ascii_case(key))
    }

    pub fn is_ignored_header(&self, key: &str) -> bool {
        let key = key.trim();
        self.ignored_headers.iter().any(|h| h.eq_ignore_ascii_case(key))
    }

    /// Substring match against the ignored-domain list.
    pub fn is_ignored_domain(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.ignored_domains
            .iter()
            .any(|domain| !domain.is_empty() && host.contains(&domain.to_ascii_lowercase()))
    }

    /// Matches the extension of the last path segment, query excluded.
    pub fn is_ignored_file(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        match segment.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => self
                .ignored_files
                .iter()
                .any(|file| file.trim_start_matches('.').eq_ignore_ascii_case(extension)),
            _ => false,
        }
    }

    /// Matches a response content type such as `image/png` or `text/css`.
    pub fn is_ignored_content_type(&self, content_type: &str) -> bool {
        let subtype = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim();
        !subtype.is_empty()
            && self
                .ignored_files
                .iter()
                .any(|file| file.eq_ignore_ascii_case(subtype))
    }

    /// Apply `AUTOCORRELATE_*` overrides from the process environment.
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the process environment in
    /// production, a map in tests).
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("MIN_VALUE_LENGTH") {
            self.min_value_length = parse_override("MIN_VALUE_LENGTH", &value)?;
        }
        if let Some(value) = var("CONTEXT_LENGTH") {
            self.context_length = parse_override("CONTEXT_LENGTH", &value)?;
        }
        if let Some(value) = var("MAX_APPEARANCES") {
            self.max_number_of_appearances = parse_override("MAX_APPEARANCES", &value)?;
        }
        if let Some(value) = var("IGNORE_BOOLEAN_VALUES") {
            self.ignore_boolean_values = parse_override("IGNORE_BOOLEAN_VALUES", &value)?;
        }

        let lists: [(&str, &mut Vec<String>); 4] = [
            ("IGNORED_DOMAINS", &mut self.ignored_domains),
            ("IGNORED_HEADERS", &mut self.ignored_headers),
            ("IGNORED_FILES", &mut self.ignored_files),
            ("IGNORED_PARAMETERS", &mut self.ignored_parameters),
        ];
        for (name, target) in lists {
            if let Some(value) = var(name) {
                let entries = split_list(&value);
                if !entries.is_empty() {
                    *target = entries;
                }
            }
        }

        Ok(())
    }

    pub fn log_summary(&self) {
        trace!(
            min_value_length = self.min_value_length,
            context_length = self.context_length,
            max_number_of_appearances = self.max_number_of_appearances,
            ignore_boolean_values = self.ignore_boolean_values,
            "correlation configuration"
        );
        trace!("Ignored domains: {:?}", self.ignored_domains);
        trace!("Ignored headers: {:?}", self.ignored_headers);
        trace!("Ignored files: {:?}", self.ignored_files);
        trace!("Ignored parameters: {:?}", self.ignored_parameters);
        trace!("Requested parameters: {:?}", self.requested_parameters);
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        CorrelationError::Config(format!(
            "invalid value '{value}' for {ENV_PREFIX}{name}"
        ))
    })
}
