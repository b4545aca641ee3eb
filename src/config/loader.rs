use super::Configuration;
use crate::error::{CorrelationError, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Reads a [`Configuration`] from TOML or YAML and layers environment
/// overrides on top.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: Configuration,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` (format chosen by extension) when given, otherwise keep
    /// the defaults. Environment overrides apply in both cases.
    pub async fn load(mut self, path: Option<&Path>) -> Result<Configuration> {
        if let Some(path) = path {
            let content = fs::read_to_string(path).await?;
            self.config = parse_config(path, &content)?;
            debug!("Loaded configuration from {}", path.display());
        }

        self.config.merge_env_vars()?;
        self.config.log_summary();
        Ok(self.config)
    }
}

/// Parse configuration text, picking the format from the file extension.
pub fn parse_config(path: &Path, content: &str) -> Result<Configuration> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => Ok(toml::from_str(content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
        Some("json") => Ok(serde_json::from_str(content)?),
        other => Err(CorrelationError::Config(format!(
            "unsupported configuration format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}
