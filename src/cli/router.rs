//! Command routing and execution
//!
//! Routes parsed CLI commands to their implementations.

use crate::cli::args::{Cli, Commands};
use crate::cli::commands::*;
use anyhow::Result;
use clap::CommandFactory;
use tracing::debug;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Option<Commands>, verbose: u8) -> Result<()> {
    debug!("Executing command with verbosity {}", verbose);
    match command {
        Some(Commands::Suggest {
            recording,
            replay,
            accept_orphans,
            accept_replay_orphans,
            accept_equal,
            requested,
            options,
        }) => {
            run_suggest_command(SuggestParams {
                recording,
                replay,
                accept_orphans,
                accept_replay_orphans,
                accept_equal,
                requested,
                options,
            })
            .await
        }
        Some(Commands::Failing {
            recording,
            replay,
            options,
        }) => run_failing_command(recording, replay, options).await,
        Some(Commands::Analyze { recording, options }) => run_analyze_command(recording, options).await,
        Some(Commands::Extract {
            trace,
            requests_only,
            config,
        }) => run_extract_command(trace, requests_only, config).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
