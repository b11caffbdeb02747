//! Token estimation (spec.md §4.10): a cheap character-based approximation,
//! an exact BPE count behind the `exact-tokenizer` feature, and an `auto`
//! mode that picks between them based on proximity to the model's context
//! window.

pub mod cheap;
pub mod exact;
pub mod models;

pub use cheap::cheap_tokens_approx;
pub use exact::exact_tokens;
pub use models::{lookup as lookup_model, ModelMeta, DEFAULT_CONTEXT_WINDOW};

use crate::model::TokenEstimationMode;
use crate::Result;
use std::fmt;

/// Which estimator actually produced a [`TokenEstimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationMethod {
    /// Character-count approximation (~4 chars/token).
    Cheap,
    /// Exact BPE tokenization.
    Exact,
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cheap => "cheap",
            Self::Exact => "exact",
        })
    }
}

/// A token count together with the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenEstimate {
    /// Estimated (or exact) token count.
    pub tokens: usize,
    /// Method used.
    pub method: EstimationMethod,
}

/// Fraction of the context window within which the cheap estimate is
/// considered "close enough to the boundary" to warrant the exact
/// tokenizer in `auto` mode (spec.md §4.10).
const AUTO_PRECISION_BAND: f64 = 0.15;

/// Estimates the token count of `text` per `mode`, returning `None` only
/// for [`TokenEstimationMode::Off`].
///
/// In `auto` mode, the cheap estimate is computed first; if it falls
/// within [`AUTO_PRECISION_BAND`] of `context_window` (on either side),
/// the exact tokenizer is used to resolve the boundary precisely.
/// Otherwise the cheap estimate stands.
///
/// # Errors
///
/// Propagates a tokenizer backend error (only reachable in `exact` mode,
/// since `exact_tokens` itself never fails — see its docs).
#[allow(clippy::cast_precision_loss)]
pub fn estimate_tokens_auto(
    text: &str,
    mode: TokenEstimationMode,
    context_window: usize,
) -> Result<Option<TokenEstimate>> {
    match mode {
        TokenEstimationMode::Off => Ok(None),
        TokenEstimationMode::Cheap => Ok(Some(TokenEstimate {
            tokens: cheap_tokens_approx(text),
            method: EstimationMethod::Cheap,
        })),
        TokenEstimationMode::Exact => Ok(Some(TokenEstimate {
            tokens: exact_tokens(text)?,
            method: EstimationMethod::Exact,
        })),
        TokenEstimationMode::Auto => {
            let cheap_tokens = cheap_tokens_approx(text);
            let band = (context_window as f64 * AUTO_PRECISION_BAND) as usize;
            let lower = context_window.saturating_sub(band);
            let upper = context_window.saturating_add(band);
            if (lower..=upper).contains(&cheap_tokens) {
                Ok(Some(TokenEstimate {
                    tokens: exact_tokens(text)?,
                    method: EstimationMethod::Exact,
                }))
            } else {
                Ok(Some(TokenEstimate {
                    tokens: cheap_tokens,
                    method: EstimationMethod::Cheap,
                }))
            }
        }
    }
}

/// Picks the most conservative (highest token count) of several
/// per-message estimates, used when a whole-prompt estimate and a
/// per-message breakdown disagree (spec.md §4.10).
#[must_use]
pub fn most_conservative(estimates: &[TokenEstimate]) -> Option<TokenEstimate> {
    estimates
        .iter()
        .copied()
        .max_by_key(|estimate| estimate.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_mode_returns_none() {
        let result = estimate_tokens_auto("hello world", TokenEstimationMode::Off, 16_384).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_cheap_mode() {
        let result = estimate_tokens_auto("abcd", TokenEstimationMode::Cheap, 16_384)
            .unwrap()
            .unwrap();
        assert_eq!(result.tokens, 1);
        assert_eq!(result.method, EstimationMethod::Cheap);
    }

    #[test]
    fn test_exact_mode() {
        let result = estimate_tokens_auto("hello world", TokenEstimationMode::Exact, 16_384)
            .unwrap()
            .unwrap();
        assert_eq!(result.method, EstimationMethod::Exact);
        assert!(result.tokens > 0);
    }

    #[test]
    fn test_auto_mode_far_from_window_uses_cheap() {
        let result = estimate_tokens_auto("short text", TokenEstimationMode::Auto, 128_000)
            .unwrap()
            .unwrap();
        assert_eq!(result.method, EstimationMethod::Cheap);
    }

    #[test]
    fn test_auto_mode_near_window_uses_exact() {
        // ~4 chars/token, so 16_000 chars ~ 4_000 tokens against an 4_200-token window.
        let text = "a".repeat(16_000);
        let result = estimate_tokens_auto(&text, TokenEstimationMode::Auto, 4_200)
            .unwrap()
            .unwrap();
        assert_eq!(result.method, EstimationMethod::Exact);
    }

    #[test]
    fn test_most_conservative_picks_max() {
        let estimates = vec![
            TokenEstimate {
                tokens: 10,
                method: EstimationMethod::Cheap,
            },
            TokenEstimate {
                tokens: 25,
                method: EstimationMethod::Exact,
            },
            TokenEstimate {
                tokens: 15,
                method: EstimationMethod::Cheap,
            },
        ];
        let result = most_conservative(&estimates).unwrap();
        assert_eq!(result.tokens, 25);
    }

    #[test]
    fn test_most_conservative_empty() {
        assert!(most_conservative(&[]).is_none());
    }

    #[test]
    fn test_estimation_method_display() {
        assert_eq!(EstimationMethod::Cheap.to_string(), "cheap");
        assert_eq!(EstimationMethod::Exact.to_string(), "exact");
    }
}
