//! Command implementation modules
//!
//! Each command loads its inputs, runs one engine pipeline and prints the
//! result.

pub mod analyze;
pub mod extract;
pub mod suggest;

pub use analyze::run_analyze_command;
pub use extract::run_extract_command;
pub use suggest::{run_failing_command, run_suggest_command, SuggestParams};

use crate::capture::{load_trace, Trace};
use crate::config::{ConfigLoader, Configuration};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration from `path` (or defaults) with environment overrides.
pub(crate) async fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    let description = path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    ConfigLoader::new()
        .load(path)
        .await
        .with_context(|| format!("Failed to load configuration from {description}"))
}

pub(crate) async fn load_trace_file(path: &Path) -> Result<Trace> {
    load_trace(path)
        .await
        .with_context(|| format!("Failed to load trace {}", path.display()))
}
