//! Forward-reference candidate detection: definite noun phrases ("the
//! report"), "the following X" / "these files" style forward references,
//! and the separate deictic-cue-phrase test (spec.md §4.3, §4.5 steps 1-4).

use regex::Regex;
use std::sync::OnceLock;

fn def_np_regex() -> &'static Regex {
    static DEF_NP: OnceLock<Regex> = OnceLock::new();
    DEF_NP.get_or_init(|| {
        Regex::new(r"(?i)\bthe\s+([a-zA-Z][a-zA-Z\-]*)\b").expect("valid regex")
    })
}

/// "the following report/table/..." (spec.md §4.3 `FORWARD_REF_PATTERNS`).
fn forward_ref_following_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bthe\s+following\s+([a-zA-Z][a-zA-Z\-]*)\b").expect("valid regex")
    })
}

/// "as shown below" / "as shown above" — no extracted noun.
fn forward_ref_shown_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bas\s+shown\s+(?:below|above)\b").expect("valid regex"))
}

/// "these/those files/items/data" — noun captured in group 1.
fn forward_ref_these_those_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:these|those)\s+(files|items|data)\b").expect("valid regex")
    })
}

/// `DEICTIC_CUES` (spec.md §4.3): specific cue *phrases*, not bare
/// pronouns — "this"/"it" alone must never match, or an ordinary sentence
/// like "Summarize this article" would be flagged.
fn deictic_cue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\bas\s+(?:discussed|mentioned|noted)\s+(?:earlier|above|before)\b\
              |\bcontinue\s+the\s+(?:list|analysis|discussion|report|document|table)\b\
              |\bprevious\s+(?:results?|output|answer|response)\b\
              |\bthe\s+(?:report|table|list|document|analysis|results?|output|steps?|note)\s+(?:above|below)\b\
              |\bthat\s+prior\s+(?:attachment|file|document)\b\
              |\bthe\s+aforementioned\s+(?:note|report|document|item|list|result)\b",
        )
        .expect("valid regex")
    })
}

/// Which detector produced a [`ReferenceCandidate`], used by the reference
/// rule to decide whether to also search `current[candidate.end..]`
/// (spec.md §4.5 step 5's forward-ref-only rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `DEF_NP`: "the &lt;noun&gt;".
    DefiniteNp,
    /// `FORWARD_REF_PATTERNS`: "the following X", "as shown below", etc.
    ForwardRef,
}

/// A candidate forward reference: a span of text that may refer to
/// content not present in the current prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCandidate {
    /// Byte offset of the candidate's start within the text it was found
    /// in.
    pub start: usize,
    /// Byte offset one past the candidate's end.
    pub end: usize,
    /// The matched text.
    pub text: String,
    /// The bare head noun, when one was extracted. `None` for a
    /// forward-ref match with no captured noun (e.g. "as shown below").
    pub head_noun: Option<String>,
    /// Which detector produced this candidate.
    pub kind: CandidateKind,
}

/// Scans `text` for `DEF_NP` and `FORWARD_REF_PATTERNS` candidates,
/// de-duplicated by `(start, end)` so a span matched by both detectors is
/// only reported once (spec.md §4.5 step 4). Deictic cues are a separate
/// boolean signal, not a candidate — see [`deictic_cue_present`].
#[must_use]
pub fn detect_forward_references(text: &str) -> Vec<ReferenceCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();

    for capture in def_np_regex().captures_iter(text) {
        let whole = capture.get(0).expect("capture group 0 always matches");
        let key = (whole.start(), whole.end());
        if seen.insert(key) {
            candidates.push(ReferenceCandidate {
                start: whole.start(),
                end: whole.end(),
                text: whole.as_str().to_string(),
                head_noun: capture.get(1).map(|m| m.as_str().to_string()),
                kind: CandidateKind::DefiniteNp,
            });
        }
    }

    for capture in forward_ref_following_regex().captures_iter(text) {
        let whole = capture.get(0).expect("capture group 0 always matches");
        let key = (whole.start(), whole.end());
        if seen.insert(key) {
            candidates.push(ReferenceCandidate {
                start: whole.start(),
                end: whole.end(),
                text: whole.as_str().to_string(),
                head_noun: capture.get(1).map(|m| m.as_str().to_string()),
                kind: CandidateKind::ForwardRef,
            });
        }
    }

    for matched in forward_ref_shown_regex().find_iter(text) {
        let key = (matched.start(), matched.end());
        if seen.insert(key) {
            candidates.push(ReferenceCandidate {
                start: matched.start(),
                end: matched.end(),
                text: matched.as_str().to_string(),
                head_noun: None,
                kind: CandidateKind::ForwardRef,
            });
        }
    }

    for capture in forward_ref_these_those_regex().captures_iter(text) {
        let whole = capture.get(0).expect("capture group 0 always matches");
        let key = (whole.start(), whole.end());
        if seen.insert(key) {
            candidates.push(ReferenceCandidate {
                start: whole.start(),
                end: whole.end(),
                text: whole.as_str().to_string(),
                head_noun: capture.get(1).map(|m| m.as_str().to_string()),
                kind: CandidateKind::ForwardRef,
            });
        }
    }

    candidates.sort_by_key(|candidate| candidate.start);
    candidates
}

/// Whether `text` contains any `DEICTIC_CUES` cue phrase (spec.md §4.3,
/// §4.5 step 3's `deicticCue` flag). This is a boolean signal, not a
/// per-occurrence candidate.
#[must_use]
pub fn deictic_cue_present(text: &str) -> bool {
    deictic_cue_regex().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_definite_noun_phrase() {
        let candidates = detect_forward_references("Please summarize the report.");
        assert!(candidates
            .iter()
            .any(|c| c.head_noun.as_deref() == Some("report") && c.kind == CandidateKind::DefiniteNp));
    }

    #[test]
    fn test_detects_the_following_forward_ref() {
        let candidates = detect_forward_references("Summarize the following results: x, y, z.");
        assert!(candidates.iter().any(|c| {
            c.head_noun.as_deref() == Some("results") && c.kind == CandidateKind::ForwardRef
        }));
    }

    #[test]
    fn test_detects_as_shown_below() {
        let candidates = detect_forward_references("The chart is as shown below.");
        assert!(candidates
            .iter()
            .any(|c| c.text.eq_ignore_ascii_case("as shown below")));
    }

    #[test]
    fn test_detects_these_those_files() {
        let candidates = detect_forward_references("Process those files now.");
        assert!(candidates.iter().any(|c| c.head_noun.as_deref() == Some("files")));
    }

    #[test]
    fn test_bare_pronoun_is_not_a_deictic_cue() {
        // "this"/"it" alone must never trip the deictic flag.
        assert!(!deictic_cue_present("Summarize this article in two sentences."));
        assert!(!deictic_cue_present("Make it shorter."));
    }

    #[test]
    fn test_specific_cue_phrase_is_deictic() {
        assert!(deictic_cue_present("As discussed earlier, proceed with the plan."));
        assert!(deictic_cue_present("Continue the analysis from before."));
        assert!(deictic_cue_present("Per the aforementioned note, adjust the budget."));
    }

    #[test]
    fn test_no_candidates_in_self_contained_prompt() {
        let candidates = detect_forward_references("Write a haiku about the ocean.");
        // "the ocean" is still a definite NP candidate; the rule itself
        // decides whether "ocean" is a recognized reference head.
        assert!(candidates
            .iter()
            .any(|c| c.head_noun.as_deref() == Some("ocean")));
    }

    #[test]
    fn test_dedup_overlapping_spans() {
        let candidates = detect_forward_references("the following report, the following report");
        let spans: std::collections::HashSet<(usize, usize)> =
            candidates.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(spans.len(), candidates.len());
    }

    #[test]
    fn test_candidates_sorted_by_position() {
        let candidates =
            detect_forward_references("the report and the following list and the plan too.");
        let starts: Vec<usize> = candidates.iter().map(|c| c.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }
}
