//! INVALID_SCHEMA rule: flags a caller-supplied JSON Schema that is
//! structurally unreliable (spec.md §4.9).

use crate::error::SchemaError;
use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, Issue, IssueCode, Occurrence, Report,
    Scope, Severity, StructuredEvidence,
};
use crate::schema::validate;
use crate::Result;

const CODE: &str = "INVALID_SCHEMA";
/// Structural errors beyond this count are still counted but not detailed.
const MAX_DETAILED: usize = 5;
/// Structural errors beyond this count are not reported as occurrences.
const MAX_OCCURRENCES: usize = 10;

/// Runs the schema-validation rule.
///
/// # Errors
///
/// Returns [`SchemaError::RootNotObject`] wrapped in [`crate::Error`] only
/// when the caller is expected to treat a non-object root as a hard
/// failure; in this engine it is instead reported as an issue, so this
/// always returns `Ok(())`.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let Some(schema) = &input.schema else {
        return Ok(());
    };

    if !schema.is_object() {
        report.push_issue(root_not_object_issue());
        return Ok(());
    }

    let errors = validate(schema);
    if errors.is_empty() {
        return Ok(());
    }

    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for error in &errors {
        *counts.entry(error.keyword.label().to_string()).or_insert(0) += 1;
    }

    let occurrences: Vec<Occurrence> = errors
        .iter()
        .take(MAX_OCCURRENCES)
        .map(|error| {
            let mut occurrence = Occurrence::logical(error.message.clone());
            occurrence.bucket = Some(error.keyword.label().to_string());
            occurrence.term = Some(error.path.clone());
            occurrence
        })
        .collect();

    let detail = if errors.len() > MAX_DETAILED {
        let detailed: Vec<String> = errors.iter().take(MAX_DETAILED).map(|e| e.message.clone()).collect();
        format!(
            "{} schema structural issue(s); first {MAX_DETAILED}: {}",
            errors.len(),
            detailed.join("; ")
        )
    } else {
        let detailed: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
        format!("{} schema structural issue(s): {}", errors.len(), detailed.join("; "))
    };

    report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::InvalidSchema,
        severity: Severity::High,
        detail,
        evidence: Evidence::Structured(StructuredEvidence {
            summary: counts
                .into_iter()
                .map(|(text, count)| EvidenceSummaryEntry { text, count })
                .collect(),
            occurrences,
            first_seen_at: None,
        }),
        scope: Scope::Prompt,
        confidence: Confidence::High,
    });

    Ok(())
}

fn root_not_object_issue() -> Issue {
    let error = SchemaError::RootNotObject;
    Issue {
        id: String::new(),
        code: IssueCode::InvalidSchema,
        severity: Severity::High,
        detail: error.to_string(),
        evidence: Evidence::Flat(vec![error.to_string()]),
        scope: Scope::Prompt,
        confidence: Confidence::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalyzeOptions;
    use serde_json::json;

    #[test]
    fn test_valid_schema_no_issue() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            schema: Some(json!({ "type": "object", "properties": { "a": { "type": "string" } } })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_root_not_object() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            schema: Some(json!("not an object")),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, IssueCode::InvalidSchema);
    }

    #[test]
    fn test_structural_errors_reported() {
        let mut report = Report::new();
        let input = AnalyzeInput {
            schema: Some(json!({ "properties": { "a": {} } })),
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_no_schema_no_issue() {
        let mut report = Report::new();
        let input = AnalyzeInput::default();
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_disabled_rule_short_circuits() {
        let mut report = Report::new();
        let mut options = AnalyzeOptions::default();
        options.disabled_rules.insert(CODE.to_string());
        let input = AnalyzeInput {
            schema: Some(json!("bad")),
            options,
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }
}
