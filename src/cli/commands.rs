//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Carries no analysis
//! logic of its own: it globs files, calls [`crate::orchestrator::analyze`]
//! once per file, and hands the results to the output formatter
//! (spec.md §6).

use crate::cli::output::{format_reports, FileReport, OutputFormat};
use crate::cli::parser::{Cli, Commands};
use crate::error::CommandError;
use crate::model::AnalyzeInput;
use crate::orchestrator::analyze;
use crate::Result;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the glob matches nothing, a matched file can't be
/// read or parsed, or the output file can't be written.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Analyze { glob, out, model } => cmd_analyze(glob, out.as_deref(), model.as_deref(), format),
    }
}

fn cmd_analyze(
    pattern: &str,
    out: Option<&Path>,
    model_override: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let paths = glob::glob(pattern)
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect::<Vec<_>>();

    if paths.is_empty() {
        return Err(CommandError::NoMatches(pattern.to_string()).into());
    }

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = fs::read_to_string(&path).map_err(|e| CommandError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut input = parse_input(&raw, &path)?;
        if let Some(model) = model_override {
            input.model = Some(model.to_string());
        }

        let report = analyze(&input)?;
        reports.push(FileReport {
            file: path.display().to_string(),
            report,
        });
    }

    let rendered = format_reports(&reports, format);

    if let Some(out_path) = out {
        let mut file = fs::File::create(out_path).map_err(|e| CommandError::WriteFailed {
            path: out_path.display().to_string(),
            reason: e.to_string(),
        })?;
        file.write_all(rendered.as_bytes())
            .map_err(|e| CommandError::WriteFailed {
                path: out_path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(String::new())
    } else {
        Ok(rendered)
    }
}

/// Parses a matched file's contents as an [`AnalyzeInput`] document. A
/// bare JSON string is treated as `{"prompt": <string>}` for convenience
/// (spec.md §6: "malformed JSON in schema... surfaced as a failed call").
fn parse_input(raw: &str, path: &Path) -> Result<AnalyzeInput> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CommandError::ReadFailed {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;

    if let Some(prompt) = value.as_str() {
        return Ok(AnalyzeInput {
            prompt: Some(prompt.to_string()),
            ..Default::default()
        });
    }

    serde_json::from_value(value).map_err(|e| {
        CommandError::ReadFailed {
            path: path.display().to_string(),
            reason: format!("does not match AnalyzeInput shape: {e}"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_input_bare_string() {
        let input = parse_input("\"Hello there\"", Path::new("x.json")).unwrap();
        assert_eq!(input.prompt, Some("Hello there".to_string()));
    }

    #[test]
    fn test_parse_input_full_object() {
        let input = parse_input(
            r#"{"prompt": "Summarize {{doc}}."}"#,
            Path::new("x.json"),
        )
        .unwrap();
        assert_eq!(input.prompt, Some("Summarize {{doc}}.".to_string()));
    }

    #[test]
    fn test_parse_input_invalid_json_errors() {
        let err = parse_input("not json", Path::new("x.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Command(CommandError::ReadFailed { .. })));
    }

    #[test]
    fn test_cmd_analyze_no_matches_errors() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let err = cmd_analyze(&pattern, None, None, OutputFormat::Text).unwrap_err();
        assert!(matches!(err, crate::Error::Command(CommandError::NoMatches(_))));
    }

    #[test]
    fn test_cmd_analyze_writes_report() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("a.json");
        fs::write(&file_path, r#"{"prompt": "Summarize this."}"#).unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let output = cmd_analyze(&pattern, None, None, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_cmd_analyze_model_override() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("a.json");
        fs::write(&file_path, r#"{"prompt": "word "}"#).unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let output = cmd_analyze(&pattern, None, Some("gpt-4"), OutputFormat::Json).unwrap();
        assert!(output.contains("gpt-4"));
    }

    #[test]
    fn test_cmd_analyze_writes_to_out_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("a.json");
        fs::write(&file_path, r#"{"prompt": "Summarize this."}"#).unwrap();
        let out_path = dir.path().join("report.json");

        let pattern = format!("{}/*.json", dir.path().display());
        let output = cmd_analyze(&pattern, Some(&out_path), None, OutputFormat::Json).unwrap();
        assert!(output.is_empty());
        assert!(out_path.exists());
    }
}
