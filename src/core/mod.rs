//! Core correlation engine with pure functions
//!
//! Following the "functional core, imperative shell" pattern, everything
//! here takes in-memory captures and configuration and returns values:
//! - No file system or network access
//! - Malformed input degrades the result and is logged, never raised
//! - Collaborators (report sink, structure cache) are passed in explicitly

pub mod appearance;
pub mod diff;
pub mod extraction;
pub mod json_path;
pub mod pipeline;
pub mod suggestion;
pub mod synthesis;

pub use appearance::{Appearance, ParameterTrace, Side, SourceCategory, UsageRef};
pub use diff::DynamicCandidate;
pub use suggestion::{CorrelationRule, CorrelationSuggestion, ExtractionCandidate, ReplacementCandidate};
