//! CLI argument structures
//!
//! The main CLI structure and all subcommand definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Discover dynamic values between two traffic traces
#[derive(Parser)]
#[command(name = "autocorrelate")]
#[command(about = "autocorrelate - Suggest extraction and replacement rules for dynamic values", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options shared by every command that produces suggestions.
#[derive(Debug, Clone, Args)]
pub struct SuggestionOptions {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a recording with a replay of the same workflow
    #[command(name = "suggest")]
    Suggest {
        /// Recorded trace (HAR or native JSON/YAML)
        #[arg(long, value_name = "FILE")]
        recording: PathBuf,

        /// Replayed trace (HAR or native JSON/YAML)
        #[arg(long, value_name = "FILE")]
        replay: PathBuf,

        /// Keep parameters only present in the recording
        #[arg(long)]
        accept_orphans: bool,

        /// Keep parameters only present in the replay
        #[arg(long)]
        accept_replay_orphans: bool,

        /// Keep parameters whose values did not change
        #[arg(long)]
        accept_equal: bool,

        /// Parameter to always report (repeatable)
        #[arg(long = "request", value_name = "NAME")]
        requested: Vec<String>,

        #[command(flatten)]
        options: SuggestionOptions,
    },

    /// Explain the captures that fail on replay but not in the recording
    #[command(name = "failing")]
    Failing {
        /// Recorded trace
        #[arg(long, value_name = "FILE")]
        recording: PathBuf,

        /// Replay containing failed captures
        #[arg(long, value_name = "FILE")]
        replay: PathBuf,

        #[command(flatten)]
        options: SuggestionOptions,
    },

    /// Find request values that can be read from earlier responses
    #[command(name = "analyze")]
    Analyze {
        /// Recorded trace
        #[arg(long, value_name = "FILE")]
        recording: PathBuf,

        #[command(flatten)]
        options: SuggestionOptions,
    },

    /// Print the parameter trace of one capture file as JSON
    #[command(name = "extract")]
    Extract {
        /// Trace to extract parameters from
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,

        /// Only read what the requests send
        #[arg(long)]
        requests_only: bool,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}
