//! HTTP Archive (HAR 1.2) import.
//!
//! Only the fields the engine needs are modelled; everything else in the
//! archive is ignored by serde.

use super::{Argument, HeaderField, Request, Response, Trace};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct HarDocument {
    pub log: HarLog,
}

#[derive(Debug, Deserialize)]
pub struct HarLog {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HarEntry {
    pub request: HarRequest,
    pub response: Option<HarResponse>,
}

#[derive(Debug, Deserialize)]
pub struct HarNameValue {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HarNameValue>,
    pub post_data: Option<HarPostData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub params: Vec<HarNameValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<HarNameValue>,
    pub content: Option<HarContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

fn entry_label(index: usize, method: &str, url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    format!("{:03} {} {}", index + 1, method.to_ascii_uppercase(), path)
}

fn convert_request(label: &str, request: HarRequest) -> Request {
    let mut converted = Request::new(label, request.method, request.url);
    converted.headers = request
        .headers
        .into_iter()
        .map(|h| HeaderField::new(h.name, h.value))
        .collect();

    if let Some(post_data) = request.post_data {
        if !post_data.mime_type.is_empty() && converted.content_type().is_none() {
            converted
                .headers
                .push(HeaderField::new("Content-Type", post_data.mime_type));
        }
        match post_data.text {
            Some(text) if !text.is_empty() => converted.body = Some(text),
            _ => {
                converted.arguments = post_data
                    .params
                    .into_iter()
                    .map(|p| Argument::new(p.name, p.value))
                    .collect();
            }
        }
    }

    converted
}

fn convert_response(label: &str, url: &str, response: HarResponse) -> Response {
    let mut lines = Vec::with_capacity(response.headers.len() + 1);
    if !response.http_version.is_empty() {
        lines.push(
            format!(
                "{} {} {}",
                response.http_version, response.status, response.status_text
            )
            .trim_end()
            .to_string(),
        );
    }
    lines.extend(
        response
            .headers
            .iter()
            .map(|h| format!("{}: {}", h.name, h.value)),
    );

    let mut converted = Response::new(label)
        .with_status(response.status)
        .with_headers(lines.join("\n"));
    converted.url = Some(url.to_string());

    if let Some(content) = response.content {
        converted.binary = content.encoding.as_deref() == Some("base64");
        if !content.mime_type.is_empty() {
            converted.content_type = Some(content.mime_type);
        }
        converted.body = content.text.unwrap_or_default();
    }

    converted
}

impl From<HarDocument> for Trace {
    fn from(document: HarDocument) -> Self {
        let mut trace = Trace::default();
        for (index, entry) in document.log.entries.into_iter().enumerate() {
            let label = entry_label(index, &entry.request.method, &entry.request.url);
            let url = entry.request.url.clone();
            let response = entry
                .response
                .map(|response| convert_response(&label, &url, response));
            trace.push(convert_request(&label, entry.request), response);
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE: &str = r#"{
      "log": {
        "version": "1.2",
        "entries": [
          {
            "request": {
              "method": "get",
              "url": "https://app.example.com/login",
              "headers": [{"name": "Accept", "value": "text/html"}]
            },
            "response": {
              "status": 200,
              "statusText": "OK",
              "httpVersion": "HTTP/1.1",
              "headers": [
                {"name": "X-CSRF-Token", "value": "459581b0"},
                {"name": "Set-Cookie", "value": "sid=s1; Path=/"}
              ],
              "content": {"mimeType": "text/html", "text": "<html></html>"}
            }
          },
          {
            "request": {
              "method": "POST",
              "url": "https://app.example.com/login",
              "headers": [],
              "postData": {
                "mimeType": "application/x-www-form-urlencoded",
                "params": [{"name": "csrf", "value": "459581b0"}]
              }
            },
            "response": {
              "status": 403,
              "headers": [],
              "content": {"mimeType": "image/png", "text": "iVBOR", "encoding": "base64"}
            }
          }
        ]
      }
    }"#;

    #[test]
    fn test_har_entries_become_labelled_captures() {
        let document: HarDocument = serde_json::from_str(ARCHIVE).unwrap();
        let trace = Trace::from(document);

        assert_eq!(trace.requests.len(), 2);
        assert_eq!(trace.requests[0].label, "001 GET /login");
        assert_eq!(trace.requests[1].label, "002 POST /login");
        assert_eq!(
            trace.requests[1].arguments,
            vec![Argument::new("csrf", "459581b0")]
        );
        assert_eq!(
            trace.requests[1].content_type(),
            Some("application/x-www-form-urlencoded")
        );

        let first = &trace.responses[0];
        assert_eq!(
            first.headers,
            "HTTP/1.1 200 OK\nX-CSRF-Token: 459581b0\nSet-Cookie: sid=s1; Path=/"
        );
        assert!(first.successful);

        let second = &trace.responses[1];
        assert!(!second.successful);
        assert!(second.binary);
        assert_eq!(second.body_text(), "");
    }
}
