//! CLI layer for langpatrol.
//!
//! Provides the command-line interface using clap: glob prompt files,
//! analyze each one, and print the resulting reports (spec.md §6).

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::{FileReport, OutputFormat};
pub use parser::{Cli, Commands};
