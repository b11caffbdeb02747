//! Exact BPE token counting via `tiktoken-rs`, with a deterministic
//! word-based fallback when the `exact-tokenizer` feature is disabled or
//! the encoder cannot be constructed (spec.md §4.10).

use crate::Result;

/// Default fallback: 0.75 tokens per whitespace-delimited word, rounded up.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fallback_estimate(text: &str) -> usize {
    let words = text.split_whitespace().count();
    ((words as f64) * 0.75).ceil() as usize
}

/// Returns an exact (or best-effort) BPE token count for `text`.
///
/// # Errors
///
/// Never returns an error: a failed exact encode falls back to the
/// word-based estimate rather than surfacing a failure, since token
/// estimation is advisory (spec.md §4.10).
#[cfg(feature = "exact-tokenizer")]
pub fn exact_tokens(text: &str) -> Result<usize> {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    let result = catch_unwind(AssertUnwindSafe(|| {
        tiktoken_rs::cl100k_base().map(|bpe| bpe.encode_with_special_tokens(text).len())
    }));

    Ok(result
        .ok()
        .and_then(std::result::Result::ok)
        .unwrap_or_else(|| fallback_estimate(text)))
}

/// Fallback-only build: always uses the word-based estimate.
#[cfg(not(feature = "exact-tokenizer"))]
pub fn exact_tokens(text: &str) -> Result<usize> {
    Ok(fallback_estimate(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tokens_nonzero_for_nonempty() {
        let count = exact_tokens("the quick brown fox jumps over the lazy dog").unwrap();
        assert!(count > 0);
    }

    #[test]
    fn test_exact_tokens_empty() {
        let count = exact_tokens("").unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_fallback_estimate_scales_with_words() {
        let short = fallback_estimate("one two");
        let long = fallback_estimate("one two three four five six seven eight");
        assert!(long > short);
    }
}
