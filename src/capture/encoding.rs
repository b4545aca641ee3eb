//! Form URL-encoding helpers shared by extraction and synthesis.

use url::form_urlencoded;

/// Form-encode a value, writing spaces as `%20` rather than `+`.
pub fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Form-decode a single component. `&` is protected so the value is decoded
/// as one pair; input that does not decode to anything is returned as-is.
pub fn decode_value(value: &str) -> String {
    let protected = format!("v={}", value.replace('&', "%26"));
    form_urlencoded::parse(protected.as_bytes())
        .next()
        .map(|(_, decoded)| decoded.into_owned())
        .unwrap_or_else(|| value.to_string())
}

/// Decode `a=b&c=d` pairs in order.
pub fn parse_pairs(text: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(text.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
