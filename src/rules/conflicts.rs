//! CONFLICTING_INSTRUCTION rule: flags pairs of instructions in the same
//! text that pull in opposite directions (spec.md §4.6).
//!
//! The pattern tier always runs, matching known opposite-style phrase
//! pairs (verbose/concise, json-only/explanatory). Two further tiers are
//! opt-in: an embedding-similarity tier (low similarity between the two
//! spans corroborates a pattern-tier conflict) and an NLI-contradiction
//! tier (a high contradiction score between the two spans corroborates
//! it). Both assist tiers only ever add occurrences to a conflict the
//! pattern tier already found; they never invent a conflict pattern
//! matching didn't see, since there is no fixed "hypothesis" to classify
//! against outside the two matched spans.

use crate::embedding::{cosine_similarity, Embedder};
use crate::entailment::Classifier;
use crate::lexicon::{find_matches, PatternCategory, CONFLICT_PAIRS};
use crate::model::{
    AnalyzeInput, Confidence, Evidence, EvidenceSummaryEntry, Issue, IssueCode, Occurrence, Report,
    Scope, Severity, StructuredEvidence, Suggestion, SuggestionKind,
};
use crate::text::{create_preview_default, extract_text};
use crate::{embedding, entailment, Result};

const CODE: &str = "CONFLICTING_INSTRUCTION";

struct ConflictHit {
    left: (usize, usize),
    right: (usize, usize),
    left_category: PatternCategory,
    right_category: PatternCategory,
}

/// The conflict-pair bucket name a rule-reader cares about: which
/// dimension of the prompt is pulling in two directions.
fn bucket_for(left: PatternCategory, right: PatternCategory) -> &'static str {
    if left == PatternCategory::JsonOnly || right == PatternCategory::JsonOnly {
        "format"
    } else {
        "verbosity"
    }
}

/// Emits one conflict pair per category-pair, using the first match of
/// each side (spec.md §4.6 pattern tier): a prompt with several verbose
/// phrases and several concise phrases yields one "verbosity" pair, not
/// every verbose×concise combination.
fn pattern_conflicts(text: &str) -> Vec<ConflictHit> {
    let mut hits = Vec::new();
    for &(left_cat, right_cat) in CONFLICT_PAIRS {
        let left_matches = find_matches(left_cat, text);
        let right_matches = find_matches(right_cat, text);
        let (Some(&left), Some(&right)) = (left_matches.first(), right_matches.first()) else {
            continue;
        };
        hits.push(ConflictHit {
            left,
            right,
            left_category: left_cat,
            right_category: right_cat,
        });
    }
    hits
}

/// Returns a confidence-like score in `0.0..=1.0` when the spans'
/// similarity falls at or below `threshold` (low similarity corroborates
/// a conflict), `None` otherwise.
fn corroborate_semantic(
    embedder: &dyn Embedder,
    a: &str,
    b: &str,
    threshold: f64,
) -> Result<Option<f64>> {
    let emb_a = embedder.embed(a)?;
    let emb_b = embedder.embed(b)?;
    let similarity = f64::from(cosine_similarity(&emb_a, &emb_b));
    Ok((similarity <= threshold).then(|| (1.0 - similarity).clamp(0.0, 1.0)))
}

/// Returns the contradiction score when it meets `threshold`, `None`
/// otherwise.
fn corroborate_nli(
    classifier: &dyn Classifier,
    a: &str,
    b: &str,
    threshold: f64,
) -> Result<Option<f64>> {
    let scores = classifier.classify(a, &[b])?;
    let score = scores.first().copied().unwrap_or(0.0);
    Ok((f64::from(score) >= threshold).then(|| f64::from(score)))
}

/// Runs the conflicting-instruction rule over the whole concatenated text
/// (spec.md §4.1, §4.6).
///
/// # Errors
///
/// Propagates embedding/entailment backend errors from the opt-in
/// assist tiers.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let text = extract_text(input);
    let hits = pattern_conflicts(&text);
    if hits.is_empty() {
        return Ok(());
    }

    let embedder = input
        .options
        .use_semantic_conflict_detection
        .then(embedding::create_embedder)
        .transpose()?;
    let classifier = input
        .options
        .use_nli_conflict_detection
        .then(entailment::create_classifier)
        .transpose()?;

    let mut occurrences = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut pair_confidence_scores: Vec<f64> = Vec::new();

    for hit in &hits {
        let left_text = &text[hit.left.0..hit.left.1];
        let right_text = &text[hit.right.0..hit.right.1];

        let mut corroborated_by = Vec::new();
        if let Some(embedder) = embedder.as_deref() {
            if let Some(score) = corroborate_semantic(
                embedder,
                left_text,
                right_text,
                input.options.conflict_similarity_threshold,
            )? {
                corroborated_by.push("semantic-similarity");
                pair_confidence_scores.push(score);
            }
        }
        if let Some(classifier) = classifier.as_deref() {
            if let Some(score) = corroborate_nli(
                classifier,
                left_text,
                right_text,
                input.options.conflict_contradiction_threshold,
            )? {
                corroborated_by.push("nli-contradiction");
                pair_confidence_scores.push(score);
            }
        }

        let preview = create_preview_default(&text, hit.left.0, hit.left.1);
        let mut left_occurrence = Occurrence::positional(left_text, hit.left.0, hit.left.1, preview);
        left_occurrence.bucket = Some(bucket_for(hit.left_category, hit.right_category).to_string());
        left_occurrence.paired_with = Some(right_text.to_string());
        *counts.entry(left_text.to_string()).or_insert(0) += 1;
        occurrences.push(left_occurrence);
    }

    if occurrences.is_empty() {
        return Ok(());
    }

    let is_format_conflict = hits
        .iter()
        .any(|h| h.left_category == PatternCategory::JsonOnly || h.right_category == PatternCategory::JsonOnly);

    let summary = counts
        .into_iter()
        .map(|(text, count)| EvidenceSummaryEntry { text, count })
        .collect();
    let first_seen_at = occurrences.first().map(|o| o.start);
    let count = occurrences.len();

    // spec.md §4.6: confidence is high when the mean pair confidence
    // exceeds 0.7, else medium. With no corroborating tier enabled there
    // is nothing to average, so it defaults to medium.
    let confidence = if pair_confidence_scores.is_empty() {
        Confidence::Medium
    } else {
        let mean = pair_confidence_scores.iter().sum::<f64>() / pair_confidence_scores.len() as f64;
        if mean > 0.7 {
            Confidence::High
        } else {
            Confidence::Medium
        }
    };

    let id = report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::ConflictingInstruction,
        severity: Severity::Medium,
        detail: format!("{count} pair(s) of instructions conflict in style or format"),
        evidence: Evidence::Structured(StructuredEvidence {
            summary,
            occurrences,
            first_seen_at,
        }),
        scope: Scope::Prompt,
        confidence,
    });

    let suggestion_text = if is_format_conflict {
        "If strict JSON is required, drop commentary instructions or move them into schema metadata"
    } else {
        "Remove either the concise or step-by-step directive"
    };
    report.push_suggestion(Suggestion::for_issue(
        SuggestionKind::TightenInstruction,
        suggestion_text,
        id,
    ));

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
    fn test_detects_verbose_vs_concise() {
        let mut report = Report::new();
        let input = prompt_input("Explain thoroughly, but also be very concise.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, IssueCode::ConflictingInstruction);
    }

    #[test]
    fn test_detects_json_only_vs_explanatory() {
        let mut report = Report::new();
        let input = prompt_input("Respond only with JSON, and explain your reasoning.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_no_conflict_when_only_one_side_present() {
        let mut report = Report::new();
        let input = prompt_input("Be very concise in your answer.");
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_no_conflict_on_unrelated_text() {
        let mut report = Report::new();
        let input = prompt_input("What's the capital of France?");
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_disabled_rule_short_circuits() {
        let mut report = Report::new();
        let mut options = AnalyzeOptions::default();
        options.disabled_rules.insert(CODE.to_string());
        let input = AnalyzeInput {
            prompt: Some("Be verbose. Be concise.".to_string()),
            options,
            ..Default::default()
        };
        run(&input, &mut report).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_emits_one_pair_not_cartesian_product() {
        let mut report = Report::new();
        let input = prompt_input(
            "Be very thorough and detailed. Give an in-depth explanation. \
             Keep it brief. Be concise and to the point.",
        );
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues.len(), 1);
        let Evidence::Structured(evidence) = &report.issues[0].evidence else {
            panic!("expected structured evidence");
        };
        assert_eq!(evidence.occurrences.len(), 1);
    }

    #[test]
    fn test_pattern_only_conflict_has_medium_severity_and_confidence() {
        let mut report = Report::new();
        let input = prompt_input("Be very verbose. Keep it short.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.issues[0].severity, Severity::Medium);
        assert_eq!(report.issues[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_occurrence_records_paired_text() {
        let mut report = Report::new();
        let input = prompt_input("Be very verbose. Keep it short.");
        run(&input, &mut report).unwrap();
        let Evidence::Structured(evidence) = &report.issues[0].evidence else {
            panic!("expected structured evidence");
        };
        assert!(evidence.occurrences[0].paired_with.is_some());
    }

    #[test]
    fn test_verbosity_conflict_emits_tighten_instruction_suggestion() {
        let mut report = Report::new();
        let input = prompt_input("Be concise and give a detailed step by step explanation.");
        run(&input, &mut report).unwrap();
        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(
            report.suggestions[0].kind,
            crate::model::SuggestionKind::TightenInstruction
        );
    }

    #[test]
    fn test_format_conflict_suggests_json_specific_text() {
        let mut report = Report::new();
        let input = prompt_input("Respond only with JSON, and explain your reasoning.");
        run(&input, &mut report).unwrap();
        assert!(report.suggestions[0].text.contains("schema metadata"));
    }
}
