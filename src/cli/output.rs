//! Output formatting for CLI commands.
//!
//! Supports text, JSON, and NDJSON output formats.

use crate::model::{Issue, Report};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

/// One file's analysis result, paired with the path it came from.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The path that was analyzed, relative to the glob's working directory.
    pub file: String,
    /// The report produced for that file's input.
    pub report: Report,
}

/// Formats a batch of file reports for display.
#[must_use]
pub fn format_reports(reports: &[FileReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_reports_text(reports),
        OutputFormat::Json => format_json(&reports),
        OutputFormat::Ndjson => reports
            .iter()
            .map(|r| serde_json::to_string(r).unwrap_or_else(|_| "{}".to_string()))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_reports_text(reports: &[FileReport]) -> String {
    if reports.is_empty() {
        return "No files matched.\n".to_string();
    }

    let mut output = String::new();
    for file_report in reports {
        let _ = writeln!(output, "{}", file_report.file);
        let _ = writeln!(output, "{}", "-".repeat(file_report.file.len()));
        if file_report.report.issues.is_empty() {
            output.push_str("  no issues\n");
        } else {
            for issue in &file_report.report.issues {
                let _ = writeln!(output, "{}", format_issue_line(issue));
            }
        }
        let _ = writeln!(
            output,
            "  {} token(s) estimated, {} ms",
            file_report.report.cost.est_input_tokens, file_report.report.meta.latency_ms
        );
        output.push('\n');
    }
    output
}

fn format_issue_line(issue: &Issue) -> String {
    format!(
        "  [{:?}/{:?}] {:?}: {}",
        issue.severity, issue.confidence, issue.code, issue.detail
    )
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

/// Formats an error for output.
///
/// When format is JSON or NDJSON, returns a structured error object.
/// When format is Text, returns the error message string.
#[must_use]
pub fn format_error(error: &crate::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "success": false,
                "error": error.to_string(),
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}
