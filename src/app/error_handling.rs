//! Error handling utilities
//!
//! Centralized reporting of errors that end the process.

use crate::error::CorrelationError;
use tracing::error;

/// Exit status for a fatal error: 2 for bad input or configuration, 1 for
/// everything else.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    let invalid_input = error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<CorrelationError>(),
            Some(CorrelationError::Config(_) | CorrelationError::InvalidInput(_))
        )
    });
    if invalid_input {
        2
    } else {
        1
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// The error chain is printed in verbose mode.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("Error: {error}");

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_configuration_errors_exit_with_two() {
        let error = Err::<(), _>(CorrelationError::Config("bad".into()))
            .context("Failed to load configuration")
            .unwrap_err();
        assert_eq!(exit_code_for(&error), 2);
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = anyhow::Error::from(CorrelationError::Io(io));
        assert_eq!(exit_code_for(&error), 1);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
