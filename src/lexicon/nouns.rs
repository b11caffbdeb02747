//! Reference-rule noun taxonomy: the built-in set of "head nouns" that can
//! anchor a forward reference, and their default synonym groups
//! (spec.md §4.5).

use crate::text::normalize_noun;
use std::collections::{HashMap, HashSet};

/// Head nouns recognized out of the box, before a caller's
/// `reference_heads` are merged in.
pub const DEFAULT_REFERENCE_HEADS: &[&str] = &[
    "report", "summary", "list", "table", "plan", "code", "analysis", "document", "draft",
    "outline", "response", "answer", "result", "data", "file", "schema", "diagram", "chart",
    "example", "explanation",
];

/// Synonym groups merged bidirectionally into the reference rule's
/// "same concept" check (spec.md §4.5 step 5, branch b/e).
const DEFAULT_SYNONYM_GROUPS: &[&[&str]] = &[
    &["report", "summary", "writeup", "recap"],
    &["list", "enumeration", "rundown"],
    &["table", "grid", "matrix"],
    &["plan", "roadmap", "strategy"],
    &["analysis", "breakdown", "assessment"],
    &["document", "doc", "draft"],
    &["response", "answer", "reply"],
    &["result", "outcome", "findings"],
    &["diagram", "chart", "graph"],
    &["example", "sample", "illustration"],
];

/// Builds the default head-noun -> synonym-set map, with every group
/// expanded bidirectionally (each member maps to all the *other*
/// members).
#[must_use]
pub fn default_synonyms() -> HashMap<String, HashSet<String>> {
    let mut map: HashMap<String, HashSet<String>> = HashMap::new();
    for group in DEFAULT_SYNONYM_GROUPS {
        for &head in *group {
            let entry = map.entry(head.to_string()).or_default();
            for &other in *group {
                if other != head {
                    entry.insert(other.to_string());
                }
            }
        }
    }
    map
}

/// Merges a caller-supplied synonym map into the defaults, bidirectionally:
/// if `a -> {b}` is added, `b -> {a}` is added too (spec.md §9 open
/// question: synonym links are always treated as symmetric).
#[must_use]
pub fn merge_synonyms(
    base: &HashMap<String, HashSet<String>>,
    extra: &HashMap<String, HashSet<String>>,
) -> HashMap<String, HashSet<String>> {
    let mut merged = base.clone();
    for (head, synonyms) in extra {
        merged.entry(head.clone()).or_default().extend(synonyms.iter().cloned());
        for synonym in synonyms {
            merged
                .entry(synonym.clone())
                .or_default()
                .insert(head.clone());
        }
    }
    merged
}

/// True when `word` (after [`normalize_noun`]) is a recognized reference
/// head, either built in or supplied via `extra_heads`.
#[must_use]
pub fn is_reference_head(word: &str, extra_heads: &[String]) -> bool {
    let normalized = normalize_noun(word);
    DEFAULT_REFERENCE_HEADS.contains(&normalized.as_str())
        || extra_heads
            .iter()
            .any(|head| normalize_noun(head) == normalized)
}

/// True when `a` and `b` normalize to the same noun, or are linked as
/// synonyms in `synonyms`.
#[must_use]
pub fn are_synonyms(a: &str, b: &str, synonyms: &HashMap<String, HashSet<String>>) -> bool {
    let na = normalize_noun(a);
    let nb = normalize_noun(b);
    if na == nb {
        return true;
    }
    synonyms.get(&na).is_some_and(|set| set.contains(&nb))
}
