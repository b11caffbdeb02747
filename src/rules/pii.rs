//! PII_DETECTED rule: flags text that likely contains personally
//! identifiable information (SPEC_FULL.md §5 supplement).
//!
//! Not part of the distilled spec; added because the original tool this
//! engine was distilled from ships a PII scanner alongside its prompt
//! linter. Pattern-only, same texture as the lexicon tables: no model
//! backend, since PII shapes (emails, phone numbers, SSNs, card numbers)
//! are regular enough that a classifier would be overkill.

use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, Issue, IssueCode, Occurrence, Report,
    Scope, Severity, StructuredEvidence,
};
use crate::text::{create_preview_default, extract_text};
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const CODE: &str = "PII_DETECTED";

struct PiiPattern {
    label: &'static str,
    regex: fn() -> &'static Regex,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("valid regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b").expect("valid regex")
    })
}

fn ssn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid regex"))
}

fn credit_card_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:\d[ -]?){13,16}\b").expect("valid regex")
    })
}

const PATTERNS: &[PiiPattern] = &[
    PiiPattern { label: "email", regex: email_regex },
    PiiPattern { label: "phone", regex: phone_regex },
    PiiPattern { label: "ssn", regex: ssn_regex },
    PiiPattern { label: "credit-card", regex: credit_card_regex },
];

/// Runs the PII-detection rule over the whole concatenated text.
///
/// # Errors
///
/// Never fails.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let text = extract_text(input);
    let mut occurrences = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for pattern in PATTERNS {
        for matched in (pattern.regex)().find_iter(&text) {
            *counts.entry(pattern.label.to_string()).or_insert(0) += 1;
            let preview = create_preview_default(&text, matched.start(), matched.end());
            let mut occurrence =
                Occurrence::positional(matched.as_str(), matched.start(), matched.end(), preview);
            occurrence.bucket = Some(pattern.label.to_string());
            occurrences.push(occurrence);
        }
    }

    if occurrences.is_empty() {
        return Ok(());
    }

    let summary = counts
        .into_iter()
        .map(|(text, count)| EvidenceSummaryEntry { text, count })
        .collect();
    let first_seen_at = occurrences.first().map(|o| o.start);
    let count = occurrences.len();

    report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::PiiDetected,
        severity: Severity::High,
        detail: format!("{count} likely PII instance(s) found in the prompt text"),
        evidence: Evidence::Structured(StructuredEvidence {
            summary,
            occurrences,
            first_seen_at,
        }),
        scope: Scope::Prompt,
        confidence: Confidence::Medium,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalyzeOptions;

    fn prompt_input(text: &str) -> AnalyzeInput {
        AnalyzeInput {
            prompt: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detects_email() {
        let mut report = Report::new();
        let input = prompt_input("Contact me at jane.doe@example.com for details.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, IssueCode::PiiDetected);
    }

    #[test]
    fn test_detects_ssn() {
        let mut report = Report::new();
        let input = prompt_input("SSN: 123-45-6789");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_detects_phone() {
        let mut report = Report::new();
        let input = prompt_input("Call me at 555-123-4567 tomorrow.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_no_pii_no_issue() {
        let mut report = Report::new();
        let input = prompt_input("Summarize this report for me.");
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_disabled_rule_short_circuits() {
        let mut report = Report::new();
        let mut options = AnalyzeOptions::default();
        options.disabled_rules.insert(CODE.to_string());
        let input = AnalyzeInput {
            prompt: Some("jane.doe@example.com".to_string()),
            options,
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }
}
