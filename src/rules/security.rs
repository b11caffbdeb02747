//! SECURITY_THREAT rule: flags phrasing typical of a prompt-injection
//! attempt or a request to bypass the model's own safety instructions
//! (SPEC_FULL.md §5 supplement).
//!
//! Not part of the distilled spec; added because the original tool ships
//! a lightweight prompt-injection scanner alongside its prompt linter.
//! Pattern-only, like [`crate::rules::pii`]: a full jailbreak classifier
//! is out of scope here, but the common phrasings are regular enough to
//! catch with a curated pattern table.

use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, Issue, IssueCode, Occurrence, Report,
    Scope, Severity, StructuredEvidence,
};
use crate::text::{create_preview_default, extract_text};
use crate::Result;
use regex::RegexSet;
use std::collections::HashMap;
use std::sync::OnceLock;

const CODE: &str = "SECURITY_THREAT";

const PHRASES: &[(&str, &str)] = &[
    (
        "ignore-instructions",
        r"(?i)\bignore (?:all |any )?(?:previous|prior|above) instructions\b",
    ),
    (
        "disregard-system-prompt",
        r"(?i)\bdisregard (?:the |your )?(?:system prompt|rules|guidelines)\b",
    ),
    ("dan-jailbreak", r"(?i)\bdo anything now\b|\bDAN mode\b"),
    (
        "reveal-system-prompt",
        r"(?i)\b(?:reveal|print|repeat|show me) (?:your |the )?system prompt\b",
    ),
    (
        "pretend-no-restrictions",
        r"(?i)\bpretend (?:you have|there are) no (?:restrictions|rules|filters)\b",
    ),
    (
        "developer-mode",
        r"(?i)\benable developer mode\b|\bact as (?:if )?(?:you were )?unrestricted\b",
    ),
];

fn phrase_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new(PHRASES.iter().map(|&(_, pattern)| pattern)).expect("valid regex set")
    })
}

fn individual_regexes() -> &'static [regex::Regex] {
    static ALL: OnceLock<Vec<regex::Regex>> = OnceLock::new();
    ALL.get_or_init(|| {
        PHRASES
            .iter()
            .map(|&(_, pattern)| regex::Regex::new(pattern).expect("valid regex"))
            .collect()
    })
}

/// Runs the security-threat rule over the whole concatenated text.
///
/// # Errors
///
/// Never fails.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let text = extract_text(input);
    if !phrase_set().is_match(&text) {
        return Ok(());
    }

    let mut occurrences = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let regexes = individual_regexes();

    for (idx, &(label, _)) in PHRASES.iter().enumerate() {
        for matched in regexes[idx].find_iter(&text) {
            *counts.entry(label.to_string()).or_insert(0) += 1;
            let preview = create_preview_default(&text, matched.start(), matched.end());
            let mut occurrence =
                Occurrence::positional(matched.as_str(), matched.start(), matched.end(), preview);
            occurrence.bucket = Some(label.to_string());
            occurrences.push(occurrence);
        }
    }

    if occurrences.is_empty() {
        return Ok(());
    }

    occurrences.sort_by_key(|o| o.start);

    let summary = counts
        .into_iter()
        .map(|(text, count)| EvidenceSummaryEntry { text, count })
        .collect();
    let first_seen_at = occurrences.first().map(|o| o.start);
    let count = occurrences.len();

    report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::SecurityThreat,
        severity: Severity::High,
        detail: format!("{count} likely prompt-injection phrase(s) found in the prompt text"),
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
