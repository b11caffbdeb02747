//! MISSING_REFERENCE rule: flags forward references (definite noun
//! phrases, forward-ref phrases, deictic cues) that have no discoverable
//! antecedent (spec.md §4.5).
//!
//! Candidates are searched for an antecedent in a fixed priority order,
//! from cheapest/most-certain to most-expensive/least-certain. The first
//! branch that resolves wins. Every branch applies a context guard that
//! rejects a match preceded by an indefinite/demonstrative determiner
//! ("a", "an", "this", "that", "some", "any", "each", "every", "the") —
//! the "memory" tier branches use a narrower guard that only excludes a
//! directly preceding "the ", which is what keeps them reachable instead
//! of being shadowed by the stricter exact/synonym branches.

use crate::fulfillment::FulfillmentChecker;
use crate::lexicon::{
    are_synonyms, deictic_cue_present, default_synonyms, detect_forward_references,
    is_reference_head, merge_synonyms, CandidateKind, ReferenceCandidate,
};
use crate::model::{
    AnalyzeInput, Confidence, Evidence, FulfillmentMethod, FulfillmentStatus, Issue, IssueCode,
    Occurrence, Report, ResolutionMethod, Scope, Severity, StructuredEvidence, Suggestion,
    SuggestionKind,
};
use crate::text::{create_preview_default, get_current_prompt, get_history, normalize_noun};
use crate::{embedding, entailment, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const CODE: &str = "MISSING_REFERENCE";

/// Full context guard (spec.md §9: applied uniformly across every
/// resolution branch).
const FULL_GUARD_DETERMINERS: &[&str] =
    &["a", "an", "this", "that", "some", "any", "each", "every", "the"];
/// Narrower guard used by the "memory"/bare-mention branches (spec.md
/// §4.5 step 2's bare-mention definition excludes only a directly
/// preceding "the ").
const WEAK_GUARD_DETERMINERS: &[&str] = &["the"];

struct ResolutionOutcome {
    method: ResolutionMethod,
}

fn word_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z][A-Za-z\-]*").expect("valid regex"))
}

/// Whether the text immediately before byte offset `pos` in `haystack`
/// (scanning back at most `window` bytes) ends in one of `determiners`.
fn preceded_by_determiner(haystack: &str, pos: usize, window: usize, determiners: &[&str]) -> bool {
    let mut start = pos.saturating_sub(window);
    while start < pos && !haystack.is_char_boundary(start) {
        start += 1;
    }
    let context = haystack[start..pos].to_lowercase();
    determiners.iter().any(|determiner| {
        context.ends_with(&format!("{determiner} "))
            || context.ends_with(&format!("{determiner}\n"))
            || context.ends_with(&format!("{determiner}\t"))
    })
}

fn word_present(haystack: &str, needle: &str) -> bool {
    let normalized_needle = normalize_noun(needle);
    word_token_regex()
        .find_iter(haystack)
        .any(|m| normalize_noun(m.as_str()) == normalized_needle)
}

fn word_present_guarded(haystack: &str, needle: &str, window: usize, determiners: &[&str]) -> bool {
    let normalized_needle = normalize_noun(needle);
    word_token_regex().find_iter(haystack).any(|m| {
        normalize_noun(m.as_str()) == normalized_needle
            && !preceded_by_determiner(haystack, m.start(), window, determiners)
    })
}

fn synonym_present_guarded(
    haystack: &str,
    head: &str,
    synonyms: &HashMap<String, HashSet<String>>,
    window: usize,
    determiners: &[&str],
) -> bool {
    word_token_regex().find_iter(haystack).any(|m| {
        let word = m.as_str();
        are_synonyms(word, head, synonyms)
            && normalize_noun(word) != normalize_noun(head)
            && !preceded_by_determiner(haystack, m.start(), window, determiners)
    })
}

/// Resolves a single candidate's antecedent using the fixed branch
/// priority (spec.md §4.5 step 5, branches a-h), scanning `current_scan`
/// as "the current message" side of branches a, b and g. Called twice
/// for forward-ref candidates: once against the text before the
/// candidate, once against the text after it (spec.md §4.5 step 5).
#[allow(clippy::too_many_arguments)]
fn resolve_lexically(
    head: Option<&str>,
    current_scan: &str,
    history: &str,
    attachments: &[crate::model::Attachment],
    has_messages: bool,
    synonyms: &HashMap<String, HashSet<String>>,
) -> Option<ResolutionOutcome> {
    let head = head?;

    // a. exact head match elsewhere in the current message.
    if word_present_guarded(current_scan, head, 10, FULL_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::ExactInCurrent,
        });
    }
    // b. synonym match elsewhere in the current message.
    if synonym_present_guarded(current_scan, head, synonyms, 10, FULL_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::SynonymInCurrent,
        });
    }
    // c. exact head match in history.
    if has_messages && word_present_guarded(history, head, 30, FULL_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::Exact,
        });
    }
    // d. synonym match in history.
    if has_messages && synonym_present_guarded(history, head, synonyms, 30, FULL_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::Synonym,
        });
    }
    // e. bare mention of the head elsewhere in windowed history: a weaker
    // guard than (c), excluding only a directly preceding "the " rather
    // than the full determiner set, so it catches mentions (c) rejected
    // (e.g. preceded by "a"/"some") but still without an indefinite
    // referent right in front of them.
    if has_messages && word_present_guarded(history, head, 10, WEAK_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::Memory,
        });
    }
    // f. bare mention of a synonym elsewhere in windowed history.
    if has_messages && synonym_present_guarded(history, head, synonyms, 10, WEAK_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::SynonymMemory,
        });
    }
    // g. bare mention elsewhere in the current message (prompt-only inputs).
    if !has_messages && word_present_guarded(current_scan, head, 10, WEAK_GUARD_DETERMINERS) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::BareInCurrent,
        });
    }
    // h. resolved via an attachment's name or type. Attachments have no
    // surrounding prose, so no context guard applies.
    if attachments.iter().any(|a| {
        normalize_noun(&a.kind) == normalize_noun(head)
            || a.name.as_deref().is_some_and(|name| word_present(name, head))
    }) {
        return Some(ResolutionOutcome {
            method: ResolutionMethod::Attachment,
        });
    }

    None
}

fn bytes_window(history: &str, max_bytes: Option<usize>) -> String {
    match max_bytes {
        Some(limit) if history.len() > limit => {
            let start = history.len() - limit;
            let boundary = (start..history.len())
                .find(|&i| history.is_char_boundary(i))
                .unwrap_or(history.len());
            history[boundary..].to_string()
        }
        _ => history.to_string(),
    }
}

fn messages_window(input: &AnalyzeInput) -> String {
    let Some(messages) = &input.messages else {
        return String::new();
    };
    let limit = input.options.antecedent_window.messages;
    let slice: Vec<&str> = match limit {
        Some(n) if messages.len() > n + 1 => {
            let start = messages.len() - 1 - n;
            messages[start..messages.len() - 1]
                .iter()
                .map(|m| m.content.as_str())
                .collect()
        }
        _ => {
            if messages.is_empty() {
                Vec::new()
            } else {
                messages[..messages.len() - 1]
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect()
            }
        }
    };
    slice.join("\n")
}

/// +1/-2/-1 scoring weights for the flag decision (spec.md §4.5 step 7).
fn score_delta(method: ResolutionMethod) -> i32 {
    match method {
        ResolutionMethod::Exact
        | ResolutionMethod::ExactInCurrent
        | ResolutionMethod::Synonym
        | ResolutionMethod::SynonymInCurrent
        | ResolutionMethod::Pattern
        | ResolutionMethod::SemanticSimilarity
        | ResolutionMethod::NliEntailment => -2,
        ResolutionMethod::Memory
        | ResolutionMethod::SynonymMemory
        | ResolutionMethod::BareInCurrent
        | ResolutionMethod::Attachment => -1,
    }
}

/// Whether `method` is a "weak" resolution tier for confidence purposes
/// (spec.md §4.5 step 8: medium confidence requires a synonym/memory/
/// pattern-resolved candidate alongside an uncovered one).
fn is_weak_resolution(method: ResolutionMethod) -> bool {
    matches!(
        method,
        ResolutionMethod::Synonym
            | ResolutionMethod::SynonymInCurrent
            | ResolutionMethod::Memory
            | ResolutionMethod::SynonymMemory
            | ResolutionMethod::Pattern
    )
}

/// Runs the reference rule.
///
/// # Errors
///
/// Propagates embedding/entailment backend errors from the fulfillment
/// checker's model-assisted tiers, when enabled.
pub fn run(input: &AnalyzeInput, report: &mut Report) -> Result<()> {
    if input.options.is_disabled(CODE) {
        return Ok(());
    }

    let current = get_current_prompt(input);
    if current.is_empty() {
        return Ok(());
    }

    let candidates = detect_forward_references(&current);
    let deictic_cue = deictic_cue_present(&current);
    if candidates.is_empty() && !deictic_cue {
        return Ok(());
    }

    let synonyms = merge_synonyms(&default_synonyms(), &input.options.synonyms);
    let has_messages = input.messages.as_ref().is_some_and(|m| !m.is_empty());
    let history_full = if has_messages {
        messages_window(input)
    } else {
        get_history(input)
    };
    let history = bytes_window(&history_full, input.options.antecedent_window.bytes);

    let embedder = input
        .options
        .use_semantic_similarity
        .then(|| embedding::create_embedder())
        .transpose()?;
    let classifier = input
        .options
        .use_nli_entailment
        .then(|| entailment::create_classifier())
        .transpose()?;
    let checker = FulfillmentChecker::new(embedder.as_deref(), classifier.as_deref());

    let mut unresolved_occurrences = Vec::new();
    let mut resolved_methods: Vec<ResolutionMethod> = Vec::new();

    for candidate in &candidates {
        let head = candidate
            .head_noun
            .as_deref()
            .filter(|h| is_reference_head(h, &input.options.reference_heads));
        // A definite NP only counts as a candidate when its head is
        // recognized (spec.md §4.5 step 2); a forward-ref match with no
        // extracted noun (or an unrecognized one) is still searched, but
        // only via the fulfillment checker below.
        if candidate.head_noun.is_some() && head.is_none() {
            continue;
        }

        let current_before = &current[..candidate.start];
        let current_after = &current[candidate.end..];

        let mut outcome = resolve_lexically(
            head,
            current_before,
            &history,
            &input.attachments,
            has_messages,
            &synonyms,
        );
        // spec.md §4.5 step 5: for forward-ref candidates, repeat (a)-(h)
        // also against the text following the candidate.
        if outcome.is_none() && candidate.kind == CandidateKind::ForwardRef {
            outcome = resolve_lexically(
                head,
                current_after,
                &history,
                &input.attachments,
                has_messages,
                &synonyms,
            );
        }

        if let Some(outcome) = outcome {
            resolved_methods.push(outcome.method);
            continue;
        }

        let fulfillment = if embedder.is_some() || classifier.is_some() {
            let antecedent_text = if history.is_empty() {
                current_before
            } else {
                history.as_str()
            };
            let search_text = if candidate.kind == CandidateKind::ForwardRef && !current_after.is_empty() {
                format!("{antecedent_text}\n{current_after}")
            } else {
                antecedent_text.to_string()
            };
            Some(checker.check(&candidate.text, &search_text, None)?)
        } else {
            None
        };

        if let Some(result) = &fulfillment {
            if result.status == FulfillmentStatus::Fulfilled {
                let method = match result.method {
                    FulfillmentMethod::Pattern => ResolutionMethod::Pattern,
                    FulfillmentMethod::SemanticSimilarity => ResolutionMethod::SemanticSimilarity,
                    FulfillmentMethod::NliEntailment | FulfillmentMethod::Combined => {
                        ResolutionMethod::NliEntailment
                    }
                    FulfillmentMethod::None => unreachable!("checked above"),
                };
                resolved_methods.push(method);
                continue;
            }
        }

        unresolved_occurrences.push(build_occurrence(candidate, &current, fulfillment));
    }

    let has_candidates = !candidates.is_empty();
    let uncovered = !unresolved_occurrences.is_empty();
    let deictic_without_candidate = deictic_cue && !has_candidates;

    // Scoring (spec.md §4.5 step 7).
    let mut score = 0;
    if deictic_cue {
        score += 1;
    }
    if has_candidates {
        score += 1;
    }
    for method in &resolved_methods {
        score += score_delta(*method);
    }

    if !(uncovered || deictic_without_candidate || score >= 2) {
        return Ok(());
    }

    // Confidence (spec.md §4.5 step 8): a short history window makes
    // every resolution tier less trustworthy; otherwise a mix of
    // uncovered candidates and weak (synonym/memory/pattern) resolutions
    // keeps confidence at medium, and a fully-covered or strongly-
    // resolved picture reaches high.
    let confidence = if history.split_whitespace().count() < 20 {
        Confidence::Low
    } else if uncovered && resolved_methods.iter().any(|m| is_weak_resolution(*m)) {
        Confidence::Medium
    } else {
        Confidence::High
    };

    emit_issue(report, unresolved_occurrences, confidence, deictic_cue);
    Ok(())
}

fn build_occurrence(
    candidate: &ReferenceCandidate,
    current: &str,
    fulfillment: Option<crate::fulfillment::FulfillmentResult>,
) -> Occurrence {
    let preview = create_preview_default(current, candidate.start, candidate.end);
    let mut occurrence = Occurrence::positional(candidate.text.clone(), candidate.start, candidate.end, preview);
    occurrence.term = candidate.head_noun.clone();
    occurrence.bucket = Some("forward-reference".to_string());
    if let Some(result) = fulfillment {
        occurrence.fulfillment_status = Some(result.status);
        occurrence.fulfillment_method = Some(result.method);
        occurrence.fulfillment_confidence = Some(result.confidence);
    }
    occurrence
}

const REPORT_LIKE_HEADS: &[&str] = &["report", "document", "transcript"];
const LIST_LIKE_HEADS: &[&str] = &["list", "results"];

/// Picks the add-context suggestion text by head-noun class (spec.md
/// §4.5 step 9). `None` when no occurrence's head noun falls into either
/// class (e.g. a bare deictic cue with no head noun).
fn suggestion_text_for_heads(occurrences: &[Occurrence]) -> Option<&'static str> {
    let mut report_like = false;
    let mut list_like = false;
    for occurrence in occurrences {
        let Some(term) = &occurrence.term else {
            continue;
        };
        let normalized = normalize_noun(term);
        if REPORT_LIKE_HEADS.contains(&normalized.as_str()) {
            report_like = true;
        }
        if LIST_LIKE_HEADS.contains(&normalized.as_str()) {
            list_like = true;
        }
    }
    if report_like {
        Some("Inline a 1–3 line summary or attach the file metadata")
    } else if list_like {
        Some("Paste the prior items or a compact summary before asking to continue")
    } else {
        None
    }
}

fn emit_issue(
    report: &mut Report,
    mut occurrences: Vec<Occurrence>,
    confidence: Confidence,
    deictic_cue: bool,
) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for occurrence in &occurrences {
        *counts.entry(occurrence.text.clone()).or_insert(0) += 1;
    }
    let suggestion_text = suggestion_text_for_heads(&occurrences);
    // spec.md §4.5 step 9: smallest non-negative start, ignoring the
    // synthetic -1,-1 sentinel occurrence added below.
    let first_seen_at = occurrences
        .iter()
        .filter(|o| o.start >= 0)
        .map(|o| o.start)
        .min();
    let count = occurrences.len();

    if deictic_cue {
        occurrences.push(Occurrence::logical("deictic cue present"));
    }

    let summary = counts
        .into_iter()
        .map(|(text, count)| crate::model::EvidenceSummaryEntry { text, count })
        .collect();

    let id = report.push_issue(Issue {
        id: String::new(),
        code: IssueCode::MissingReference,
        severity: Severity::Medium,
        detail: format!("{count} reference(s) in the prompt have no discoverable antecedent"),
        evidence: Evidence::Structured(StructuredEvidence {
            summary,
            occurrences,
            first_seen_at,
        }),
        scope: Scope::Prompt,
        confidence,
    });

    if let Some(text) = suggestion_text {
        report.push_suggestion(Suggestion::for_issue(SuggestionKind::AddContext, text, id));
    }
}
