//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// langpatrol: static linter for LLM prompts.
///
/// Globs prompt/message files, runs the analysis engine over each one,
/// and prints the resulting reports.
#[derive(Parser, Debug)]
#[command(name = "langpatrol")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one or more prompt files matching a glob pattern.
    Analyze {
        /// Glob pattern matching files to analyze (e.g. `prompts/*.json`).
        ///
        /// Each matched file is parsed as an [`crate::model::AnalyzeInput`]
        /// JSON document. A file containing only a bare string is treated
        /// as `{"prompt": <string>}`.
        glob: String,

        /// Write the JSON report array to this path instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Target model identifier, overriding any `model` set in the
        /// input files (spec.md §3, §4.2).
        #[arg(short, long)]
        model: Option<String>,
    },
}
