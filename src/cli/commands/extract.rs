//! `extract` command implementation

use super::{load_configuration, load_trace_file};
use crate::capture::Trace;
use crate::config::Configuration;
use crate::core::appearance::ParameterTrace;
use crate::core::extraction::{AppearanceExtractor, RECORDING_ORIGIN};
use anyhow::{Context, Result};
use std::path::PathBuf;

fn extract_parameters(trace: &Trace, config: &Configuration, requests_only: bool) -> ParameterTrace {
    let extractor = AppearanceExtractor::new(config, RECORDING_ORIGIN);
    if requests_only {
        extractor.extract_requests(&trace.requests)
    } else {
        extractor.extract_trace(trace)
    }
}

pub async fn run_extract_command(trace: PathBuf, requests_only: bool, config: Option<PathBuf>) -> Result<()> {
    let config = load_configuration(config.as_deref()).await?;
    let trace = load_trace_file(&trace).await?;

    let parameters = extract_parameters(&trace, &config, requests_only);
    let rendered = serde_json::to_string_pretty(&parameters).context("Failed to serialize parameters")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Request, Response};

    #[test]
    fn test_requests_only_skips_responses() {
        let mut trace = Trace::default();
        trace.push(
            Request::new("page", "GET", "/page?view=grid"),
            Some(Response::new("page").with_headers("X-Token: tk-12")),
        );
        let config = Configuration::default();

        let requests = extract_parameters(&trace, &config, true);
        let full = extract_parameters(&trace, &config, false);

        assert!(requests.contains("view"));
        assert!(!requests.contains("X-Token"));
        assert!(full.contains("X-Token"));
    }
}
