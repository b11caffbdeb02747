//! NLI-entailment scoring for the fulfillment checker's third tier
//! (spec.md §4.7).
//!
//! Provides a lexical-overlap fallback classifier, or a real zero-shot
//! entailment model via `candle-transformers` when the `nli-entailment`
//! feature is enabled.

mod fallback;

#[cfg(feature = "nli-entailment")]
mod candle_impl;

pub use fallback::FallbackClassifier;

#[cfg(feature = "nli-entailment")]
pub use candle_impl::CandleClassifier;

use crate::Result;

/// Trait for NLI-style entailment scorers.
///
/// Implementations must be thread-safe (`Send + Sync`) to support
/// parallel fulfillment checks across multiple reference candidates.
pub trait Classifier: Send + Sync {
    /// Scores each of `hypotheses` against `premise`, returning an
    /// entailment-likelihood in `[0, 1]` per hypothesis, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails for the backend in use.
    fn classify(&self, premise: &str, hypotheses: &[&str]) -> Result<Vec<f32>>;
}

/// Creates the default classifier based on available features.
///
/// - With `nli-entailment`: returns [`CandleClassifier`].
/// - Without: returns [`FallbackClassifier`].
///
/// # Errors
///
/// Returns an error if classifier initialization fails.
#[cfg(feature = "nli-entailment")]
pub fn create_classifier() -> Result<Box<dyn Classifier>> {
    Ok(Box::new(CandleClassifier::new()?))
}

/// Creates the default classifier based on available features.
///
/// # Errors
///
/// Never fails for the fallback classifier.
#[cfg(not(feature = "nli-entailment"))]
pub fn create_classifier() -> Result<Box<dyn Classifier>> {
    Ok(Box::new(FallbackClassifier::new()))
}
