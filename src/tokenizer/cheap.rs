//! Cheap token estimation: a constant-time character-based approximation
//! (spec.md §4.10).

/// Characters-per-token divisor for the cheap estimate.
const CHARS_PER_TOKEN: f64 = 4.0;

/// Approximates a token count from `text.len()` at roughly 4 characters
/// per token, rounding up.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn cheap_tokens_approx(text: &str) -> usize {
    (text.chars().count() as f64 / CHARS_PER_TOKEN).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(cheap_tokens_approx(""), 0);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(cheap_tokens_approx("abc"), 1);
        assert_eq!(cheap_tokens_approx("abcd"), 1);
        assert_eq!(cheap_tokens_approx("abcde"), 2);
    }

    #[test]
    fn test_multibyte_counts_chars_not_bytes() {
        // 4 multi-byte chars should still approximate to 1 token.
        assert_eq!(cheap_tokens_approx("日本語で"), 1);
    }

    #[test]
    fn test_longer_text() {
        let text = "a".repeat(400);
        assert_eq!(cheap_tokens_approx(&text), 100);
    }
}
