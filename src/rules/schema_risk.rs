//! SCHEMA_RISK rule: flags a prompt that supplies a JSON Schema but never
//! instructs the model to actually emit JSON, or never mentions the
//! schema's required properties (spec.md §4.8).
//!
//! This rule only runs when [`schema_validation`](crate::rules::schema_validation)
//! would not already flag the schema as structurally invalid: a broken
//! schema can't meaningfully be checked for "risk of not being honored".

use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, Issue, IssueCode, Report, Scope,
    Severity, StructuredEvidence, Suggestion, SuggestionKind,
};
use crate::schema::validate;
use crate::text::extract_text;
use crate::Result;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const CODE: &str = "SCHEMA_RISK";

fn prose_after_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:add|include|write)\s+(?:a\s+)?(?:brief\s+)?commentary\s+(?:after|following|below)\b|\boutput\s+json\s+(?:and|then|followed\s+by)\b",
        )
        .expect("valid regex")
    })
}

fn required_properties(schema: &Value) -> Vec<String> {
    let Value::Object(map) = schema else {
        return Vec::new();
    };
    map.get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(ToString::to_string)
        .collect()
}

fn mentions_json(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("json") || text.contains('{') || text.contains('[') || text.contains('"')
}

/// Runs the schema-risk rule.
///
/// # Errors
///
/// Never fails.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let Some(schema) = &input.schema else {
        return Ok(());
    };
    if !schema.is_object() || !validate(schema).is_empty() {
        // Structurally invalid; schema_validation's rule owns this case.
        return Ok(());
    }

    let text = extract_text(input);
    let lower = text.to_lowercase();
    let requests_json = mentions_json(&text);

    let mut reasons = Vec::new();
    let mut prose_after_json = false;

    if !requests_json {
        reasons.push("the prompt never mentions JSON as the expected output format".to_string());
    } else if prose_after_json_regex().is_match(&text) {
        prose_after_json = true;
        reasons.push(
            "the prompt asks for JSON but also asks for commentary around it, risking non-JSON output"
                .to_string(),
        );
    }

    let missing_properties: Vec<String> = required_properties(schema)
        .into_iter()
        .filter(|name| !lower.contains(&name.to_lowercase()))
        .collect();

    if !missing_properties.is_empty() {
        reasons.push(format!(
            "required propert{} never mentioned in the prompt: {}",
            if missing_properties.len() == 1 { "y" } else { "ies" },
            missing_properties.join(", ")
        ));
    }

    if reasons.is_empty() {
        return Ok(());
    }

    let summary = missing_properties
        .iter()
        .map(|name| EvidenceSummaryEntry {
            text: name.clone(),
            count: 1,
        })
        .collect();

    let id = report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::SchemaRisk,
        severity: Severity::High,
        detail: format!("prompt may not honor the supplied schema: {}", reasons.join("; ")),
        evidence: Evidence::Structured(StructuredEvidence {
            summary,
            occurrences: Vec::new(),
            first_seen_at: None,
        }),
        scope: Scope::Prompt,
        confidence: Confidence::Medium,
    });

    if prose_after_json {
        report.push_suggestion(Suggestion::for_issue(
            SuggestionKind::EnforceJson,
            "Require strict JSON-only output and move any commentary into a separate field",
            id,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalyzeOptions;
    use serde_json::json;

    #[test]
    fn test_no_schema_no_issue() {
        let mut report = Report::new();
        run(&AnalyzeInput::default(), &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_schema_without_json_mention_flagged() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            prompt: Some("Summarize this document.".to_string()),
            schema: Some(json!({ "type": "object", "properties": { "summary": { "type": "string" } } })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::High);
    }

    #[test]
    fn test_schema_honored_no_issue() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            prompt: Some(
                "Respond with JSON containing a \"summary\" field per the schema.".to_string(),
            ),
            schema: Some(json!({
                "type": "object",
                "properties": { "summary": { "type": "string" } },
                "required": ["summary"]
            })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_prose_after_json_emits_enforce_json_suggestion() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            prompt: Some(
                "Output JSON and then add commentary after the JSON explaining your reasoning."
                    .to_string(),
            ),
            schema: Some(json!({ "type": "object" })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.suggestions[0].kind, crate::model::SuggestionKind::EnforceJson);
    }

    #[test]
    fn test_missing_required_property_flagged() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            prompt: Some("Respond with JSON.".to_string()),
            schema: Some(json!({
                "type": "object",
                "properties": { "total": { "type": "number" } },
                "required": ["total"]
            })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::High);
    }

    #[test]
    fn test_invalid_schema_skipped_here() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            prompt: Some("Respond with JSON.".to_string()),
            schema: Some(json!({ "properties": { "a": {} } })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_disabled_rule_short_circuits() {
        let mut report = Report::new();
        let mut options = AnalyzeOptions::default();
        options.disabled_rules.insert(CODE.to_string());
        let input = AnalyzeInput {
            prompt: Some("Summarize.".to_string()),
            schema: Some(json!({ "type": "object" })),
            options,
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }
}
