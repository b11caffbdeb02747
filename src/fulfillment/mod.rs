//! Hierarchical fulfillment checker: decides whether a reference candidate
//! (or a conflict pair) is backed by real content, using up to three tiers
//! of evidence (spec.md §4.7).
//!
//! Tiers, in order of cheapness: a lexical pattern match, an embedding
//! cosine-similarity score, and an NLI-entailment score. Each tier is
//! independently optional; when more than one tier crosses its threshold
//! the verdict method is reported as `combined`, grounded in the same
//! multi-signal-fusion idea as a hybrid-search rank fusion, generalized
//! here from "rank fusion" to "verdict fusion".

use crate::embedding::{cosine_similarity, Embedder};
use crate::entailment::Classifier;
use crate::model::{FulfillmentMethod, FulfillmentStatus};
use crate::Result;

/// Minimum combined score for a `Fulfilled` verdict.
pub const FULFILLED_THRESHOLD: f64 = 0.5;
/// Minimum combined score for an `Uncertain` (rather than `Unfulfilled`) verdict.
pub const UNCERTAIN_THRESHOLD: f64 = 0.35;

const PATTERN_WEIGHT: f64 = 0.4;
const SIMILARITY_WEIGHT: f64 = 0.3;
const ENTAILMENT_WEIGHT: f64 = 0.3;

/// The verdict produced by [`FulfillmentChecker::check`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FulfillmentResult {
    /// Overall status.
    pub status: FulfillmentStatus,
    /// Which tier(s) produced the verdict.
    pub method: FulfillmentMethod,
    /// Combined confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Per-tier inputs for a single fulfillment check. Each is `None` when
/// that tier was not consulted (either disabled by options, or the
/// pattern tier simply didn't fire).
#[derive(Debug, Clone, Copy, Default)]
struct TierScores {
    pattern: Option<f64>,
    similarity: Option<f64>,
    entailment: Option<f64>,
}

impl TierScores {
    fn combine(self) -> (f64, FulfillmentMethod) {
        let weighted: Vec<(f64, f64)> = [
            self.pattern.map(|s| (s, PATTERN_WEIGHT)),
            self.similarity.map(|s| (s, SIMILARITY_WEIGHT)),
            self.entailment.map(|s| (s, ENTAILMENT_WEIGHT)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if weighted.is_empty() {
            return (0.0, FulfillmentMethod::None);
        }

        let total_weight: f64 = weighted.iter().map(|(_, w)| w).sum();
        let combined: f64 = weighted.iter().map(|(s, w)| s * w).sum::<f64>() / total_weight;

        let crossing = weighted
            .iter()
            .filter(|(score, _)| *score >= UNCERTAIN_THRESHOLD)
            .count();

        let method = if crossing >= 2 {
            FulfillmentMethod::Combined
        } else if self.entailment.is_some_and(|s| s >= UNCERTAIN_THRESHOLD) {
            FulfillmentMethod::NliEntailment
        } else if self.similarity.is_some_and(|s| s >= UNCERTAIN_THRESHOLD) {
            FulfillmentMethod::SemanticSimilarity
        } else if self.pattern.is_some_and(|s| s >= UNCERTAIN_THRESHOLD) {
            FulfillmentMethod::Pattern
        } else {
            // None of the tiers individually crossed the uncertain band;
            // attribute to whichever contributed the most weight so the
            // report still names a tier.
            [
                (self.pattern, FulfillmentMethod::Pattern),
                (self.similarity, FulfillmentMethod::SemanticSimilarity),
                (self.entailment, FulfillmentMethod::NliEntailment),
            ]
            .into_iter()
            .filter_map(|(score, method)| score.map(|s| (s, method)))
            .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(FulfillmentMethod::None, |(_, method)| method)
        };

        (combined, method)
    }
}

/// Checks whether a candidate reference (or conflict pair) is fulfilled,
/// running only the tiers enabled by the caller.
pub struct FulfillmentChecker<'a> {
    embedder: Option<&'a dyn Embedder>,
    classifier: Option<&'a dyn Classifier>,
}

impl<'a> FulfillmentChecker<'a> {
    /// Creates a checker with the given optional model-assisted tiers.
    /// Pass `None` for a tier to skip it regardless of a pattern match.
    #[must_use]
    pub const fn new(embedder: Option<&'a dyn Embedder>, classifier: Option<&'a dyn Classifier>) -> Self {
        Self {
            embedder,
            classifier,
        }
    }

    /// Evaluates whether `candidate_text` is fulfilled by `antecedent_text`.
    ///
    /// `pattern_hit` is the already-computed lexical/positional match
    /// result (spec.md §4.5's exact/synonym/memory branches feed this in
    /// as `1.0` when resolved, `None` when no lexical resolution was
    /// found).
    ///
    /// # Errors
    ///
    /// Propagates embedding or entailment backend errors.
    pub fn check(
        &self,
        candidate_text: &str,
        antecedent_text: &str,
        pattern_hit: Option<f64>,
    ) -> Result<FulfillmentResult> {
        let mut scores = TierScores {
            pattern: pattern_hit,
            ..TierScores::default()
        };

        if let Some(embedder) = self.embedder {
            let candidate_emb = embedder.embed(candidate_text)?;
            let antecedent_emb = embedder.embed(antecedent_text)?;
            scores.similarity =
                Some(f64::from(cosine_similarity(&candidate_emb, &antecedent_emb)).clamp(0.0, 1.0));
        }

        if let Some(classifier) = self.classifier {
            let result = classifier.classify(antecedent_text, &[candidate_text])?;
            scores.entailment = result.first().map(|&s| f64::from(s));
        }

        let (combined, method) = scores.combine();

        let status = if combined >= FULFILLED_THRESHOLD {
            FulfillmentStatus::Fulfilled
        } else if combined >= UNCERTAIN_THRESHOLD {
            FulfillmentStatus::Uncertain
        } else {
            FulfillmentStatus::Unfulfilled
        };

        Ok(FulfillmentResult {
            status,
            method,
            confidence: combined,
        })
    }
}
