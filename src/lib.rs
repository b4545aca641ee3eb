//! # autocorrelate
//!
//! Finds values that change between two captured runs of the same HTTP
//! workflow (session tokens, CSRF nonces, generated ids) and synthesizes,
//! for each one, a regex that extracts it from a response and regexes that
//! substitute it into later requests.
//!
//! ## Modules
//!
//! - `core` - The pure engine: appearance extraction, cross-trace diff,
//!   suggestion synthesis and JSON path resolution
//! - `capture` - Request/response model and trace loading (HAR, JSON, YAML)
//! - `config` - Engine configuration with file and environment loading
//! - `cli` - Command-line argument parsing, command routing and output
//! - `app` - Logging setup and fatal error handling for the binary
//! - `error` - Error type of the loading shell

pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use capture::{Request, Response, Trace};
pub use config::Configuration;
pub use crate::core::diff::{diff, diff_failed_replay, DynamicCandidate};
pub use crate::core::extraction::{extract, extract_requests, extract_trace};
pub use crate::core::pipeline::{analyze_recording, partition_orphans, suggest_from_failing_replay, suggest_from_traces};
pub use crate::core::suggestion::CorrelationSuggestion;
pub use crate::core::synthesis::{synthesize, Synthesizer};
pub use error::{CorrelationError, Result};
