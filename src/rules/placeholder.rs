//! MISSING_PLACEHOLDER rule: flags template placeholders left unsubstituted
//! in the final prompt text (spec.md §4.4).

use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, IssueCode, Occurrence, Report,
    Scope, Severity, StructuredEvidence, TemplateDialect,
};
use crate::text::create_preview_default;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const CODE: &str = "MISSING_PLACEHOLDER";

fn handlebars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*[#/]?[\w][\w.\-]*\s*\}\}").expect("valid regex"))
}

fn jinja_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*[\w][\w.\-]*\s*\}\}|\{%\s*[\w][\w\s.\-]*%\}").expect("valid regex")
    })
}

fn ejs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<%=?\s*[^%>][^%]*%>").expect("valid regex"))
}

/// Guesses the template dialect from placeholder syntax present in `text`,
/// preferring the most specific signal (block helpers / tags over a bare
/// `{{var}}`, which both Handlebars and Mustache share).
#[must_use]
pub fn detect_template_dialect(text: &str) -> Option<TemplateDialect> {
    if text.contains("<%") {
        return Some(TemplateDialect::Ejs);
    }
    if text.contains("{%") {
        return Some(TemplateDialect::Jinja);
    }
    if text.contains("{{#") || text.contains("{{/") {
        return Some(TemplateDialect::Handlebars);
    }
    if handlebars_regex().is_match(text) {
        return Some(TemplateDialect::Mustache);
    }
    None
}

fn regex_for(dialect: TemplateDialect) -> &'static Regex {
    match dialect {
        TemplateDialect::Handlebars | TemplateDialect::Mustache => handlebars_regex(),
        TemplateDialect::Jinja => jinja_regex(),
        TemplateDialect::Ejs => ejs_regex(),
    }
}

fn extract_term(matched: &str) -> String {
    matched
        .trim_start_matches("{{")
        .trim_start_matches("{%")
        .trim_start_matches("<%=")
        .trim_start_matches("<%")
        .trim_end_matches("}}")
        .trim_end_matches("%}")
        .trim_end_matches("%>")
        .trim()
        .to_string()
}

/// Runs the placeholder rule against the whole concatenated text
/// (spec.md §4.1, §4.4).
///
/// # Errors
///
/// Never fails; returns `Ok(())` unconditionally. The `Result` return
/// type matches the other rules' signature for uniform orchestration.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    // spec.md §4.4: input is `input.prompt` plus optional `templateDialect`
    // only — messages are out of scope for this rule.
    let Some(text) = input.prompt.as_deref() else {
        return Ok(());
    };
    let dialect = match input.template_dialect {
        Some(dialect) => dialect,
        None => match detect_template_dialect(text) {
            Some(dialect) => dialect,
            None => return Ok(()),
        },
    };
    let pattern = regex_for(dialect);

    const MAX_POSITIONS_PER_VARIABLE: usize = 3;
    const MAX_TOTAL_POSITIONS: usize = 50;

    let mut occurrences = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut recorded_per_term: HashMap<String, usize> = HashMap::new();

    for matched in pattern.find_iter(text) {
        let term = extract_term(matched.as_str());
        *counts.entry(term.clone()).or_insert(0) += 1;

        let recorded = recorded_per_term.entry(term.clone()).or_insert(0);
        if *recorded >= MAX_POSITIONS_PER_VARIABLE || occurrences.len() >= MAX_TOTAL_POSITIONS {
            continue;
        }
        *recorded += 1;

        let preview = create_preview_default(text, matched.start(), matched.end());
        let mut occurrence =
            Occurrence::positional(matched.as_str(), matched.start(), matched.end(), preview);
        occurrence.term = Some(term);
        occurrence.bucket = Some("placeholder".to_string());
        occurrences.push(occurrence);
    }

    if counts.is_empty() {
        return Ok(());
    }

    let issue_count: usize = counts.values().sum();
    let summary = counts
        .into_iter()
        .map(|(text, count)| EvidenceSummaryEntry { text, count })
        .collect();
    let first_seen_at = occurrences.first().map(|o| o.start);

    let issue = crate::model::Issue {
        id: String::new(),
        code: IssueCode::MissingPlaceholder,
        severity: Severity::High,
        detail: format!(
            "{issue_count} unresolved template placeholder(s) remain in the prompt text"
        ),
        evidence: Evidence::Structured(StructuredEvidence {
            summary,
            occurrences,
            first_seen_at,
        }),
        scope: Scope::Prompt,
        confidence: Confidence::High,
    };

    report.push_issue(issue);

    Ok(())
}
