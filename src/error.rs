use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the imperative shell around the correlation engine.
///
/// The engine itself never fails: malformed captures degrade the result and
/// are logged. These variants cover loading configuration and traces from
/// disk and validating command-line input.
#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported capture format for {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CorrelationError>;
