use super::har::HarDocument;
use super::Trace;
use crate::error::{CorrelationError, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Load a trace from disk.
///
/// `.har` files and JSON documents with a top-level `log` object are read as
/// HTTP Archives; other `.json` files and `.yaml`/`.yml` files are read in the
/// crate's own trace format.
pub async fn load_trace(path: &Path) -> Result<Trace> {
    let content = fs::read_to_string(path).await?;
    let trace = parse_trace(path, &content)?;
    debug!(
        "Loaded {} requests and {} responses from {}",
        trace.requests.len(),
        trace.responses.len(),
        path.display()
    );
    Ok(trace)
}

pub fn parse_trace(path: &Path, content: &str) -> Result<Trace> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("har") => Ok(serde_json::from_str::<HarDocument>(content)?.into()),
        Some("json") => {
            let value: serde_json::Value = serde_json::from_str(content)?;
            if value.get("log").is_some_and(|log| log.is_object()) {
                Ok(serde_json::from_value::<HarDocument>(value)?.into())
            } else {
                Ok(serde_json::from_value(value)?)
            }
        }
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
        other => Err(CorrelationError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: format!("unknown extension {:?}", other.unwrap_or("")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_native_json_trace() {
        let trace = parse_trace(
            Path::new("recording.json"),
            r#"{
                "requests": [{"label": "login", "method": "POST", "url": "/login",
                              "arguments": [{"name": "csrf", "value": "459581b0"}]}],
                "responses": [{"label": "login", "status": 200, "headers": "X-A: b"}]
            }"#,
        )
        .unwrap();

        assert_eq!(trace.requests[0].arguments[0].value, "459581b0");
        assert!(trace.responses[0].successful);
    }

    #[test]
    fn test_parse_yaml_trace_defaults_method() {
        let trace = parse_trace(
            Path::new("replay.yml"),
            "requests:\n  - label: home\n    url: /home\nresponses: []\n",
        )
        .unwrap();
        assert_eq!(trace.requests[0].method, "GET");
    }

    #[test]
    fn test_json_with_log_is_har() {
        let trace = parse_trace(
            Path::new("capture.json"),
            r#"{"log": {"entries": [{"request": {"method": "GET", "url": "http://h/x"}}]}}"#,
        )
        .unwrap();
        assert_eq!(trace.requests[0].label, "001 GET /x");
        assert!(trace.responses.is_empty());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = parse_trace(Path::new("trace.xml"), "<x/>").unwrap_err();
        assert!(matches!(err, CorrelationError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_load_trace_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        std::fs::write(&path, r#"{"requests": [], "responses": []}"#).unwrap();

        let trace = load_trace(&path).await.unwrap();
        assert!(trace.requests.is_empty());
    }
}
