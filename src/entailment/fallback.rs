//! Lexical-overlap fallback classifier.
//!
//! Provides a deterministic entailment-score approximation when no real
//! NLI model is available: hypotheses that share more normalized words
//! with the premise score higher.

use crate::entailment::Classifier;
use crate::text::normalize_phrase;
use crate::Result;
use std::collections::HashSet;

/// Lexical-overlap fallback classifier.
///
/// Not true entailment reasoning; scores hypotheses by normalized
/// word-overlap with the premise (Jaccard-style), clamped to `[0, 1]`.
/// Use [`crate::entailment::CandleClassifier`] for real zero-shot
/// entailment.
///
/// # Examples
///
/// ```
/// use langpatrol::entailment::{Classifier, FallbackClassifier};
///
/// let classifier = FallbackClassifier::new();
/// let scores = classifier
///     .classify("the cat sat on the mat", &["a cat is on a mat"])
///     .unwrap();
/// assert_eq!(scores.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackClassifier;

impl FallbackClassifier {
    /// Creates a new fallback classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn word_set(text: &str) -> HashSet<String> {
        normalize_phrase(text)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(premise_words: &HashSet<String>, hypothesis: &str) -> f32 {
        let hyp_words = Self::word_set(hypothesis);
        if hyp_words.is_empty() {
            return 0.0;
        }
        let overlap = hyp_words.intersection(premise_words).count();
        (overlap as f32 / hyp_words.len() as f32).clamp(0.0, 1.0)
    }
}

impl Classifier for FallbackClassifier {
    fn classify(&self, premise: &str, hypotheses: &[&str]) -> Result<Vec<f32>> {
        let premise_words = Self::word_set(premise);
        Ok(hypotheses
            .iter()
            .map(|h| Self::score(&premise_words, h))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_overlap_scores_high() {
        let classifier = FallbackClassifier::new();
        let scores = classifier
            .classify("the quarterly report is attached", &["the report is attached"])
            .unwrap();
        assert!(scores[0] > 0.5);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let classifier = FallbackClassifier::new();
        let scores = classifier
            .classify("the quarterly report is attached", &["bananas are yellow"])
            .unwrap();
        assert!((scores[0] - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_multiple_hypotheses() {
        let classifier = FallbackClassifier::new();
        let scores = classifier
            .classify("ship the code today", &["ship the code", "eat lunch"])
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_empty_hypothesis_scores_zero() {
        let classifier = FallbackClassifier::new();
        let scores = classifier.classify("some premise", &[""]).unwrap();
        assert!((scores[0] - 0.0).abs() < f32::EPSILON);
    }
}
