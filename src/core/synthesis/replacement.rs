//! Replacement regex templates per source category.

use crate::core::appearance::{Side, SourceCategory};

/// Regex whose first group is the value to substitute in a request, or
/// `None` when the category is not something a request sends.
pub fn replacement_regex(name: &str, source: SourceCategory) -> Option<String> {
    let name = regex::escape(name);
    let template = match source {
        SourceCategory::Header(Side::Request) => format!("{name}: ([^&]+)"),
        SourceCategory::HeaderFields(Side::Request) => format!("{name}=([^;]+)"),
        SourceCategory::BearerToken => format!(r"{name}: Bearer ([^&\s]+)"),
        SourceCategory::JsonBody(Side::Request) | SourceCategory::JsonBodyNumeric(Side::Request) => {
            format!(r#""{name}"\s*:\s*"?([^",}}\]]+)"?"#)
        }
        SourceCategory::JsonBodyArray(Side::Request) => {
            format!(r#""{name}"\s*:\s*\[\s*"?([^",\]]+)"?"#)
        }
        SourceCategory::Arguments | SourceCategory::RawBody => format!("{name}=([^&]+)"),
        SourceCategory::UrlQuery => format!(r"(?:\?|&){name}=(.+?)(?:&|$)"),
        SourceCategory::RequestPath => format!(r"\/{name}\/(.+?)(?:\/|\?|$)"),
        SourceCategory::Header(Side::Response)
        | SourceCategory::HeaderFields(Side::Response)
        | SourceCategory::JsonBody(Side::Response)
        | SourceCategory::JsonBodyNumeric(Side::Response)
        | SourceCategory::JsonBodyArray(Side::Response)
        | SourceCategory::Cookie => return None,
    };
    Some(template)
}
