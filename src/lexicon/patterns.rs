//! Conflicting-instruction pattern tables (spec.md §4.6): regex sets for
//! each instruction "style", plus the pairs of styles that conflict when
//! both appear in the same prompt.

use regex::Regex;
use std::sync::OnceLock;

macro_rules! static_regex_set {
    ($name:ident, [$($pattern:expr),+ $(,)?]) => {{
        static $name: OnceLock<Vec<Regex>> = OnceLock::new();
        $name.get_or_init(|| {
            vec![$(Regex::new($pattern).expect("valid regex")),+]
        })
    }};
}

/// An instruction "style" the conflict rule watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    /// Asks for a long, thorough, detailed answer.
    Verbose,
    /// Asks for a short, terse answer.
    Concise,
    /// Demands machine-parseable JSON and nothing else.
    JsonOnly,
    /// Asks for prose reasoning/explanation alongside the answer.
    Explanatory,
}

impl PatternCategory {
    fn patterns(self) -> &'static Vec<Regex> {
        match self {
            Self::Verbose => static_regex_set!(
                VERBOSE,
                [
                    r"(?i)\bbe (very )?verbose\b",
                    r"(?i)\bin (great |extensive )?detail\b",
                    r"(?i)\bexplain (thoroughly|exhaustively)\b",
                    r"(?i)\bprovide a (detailed|comprehensive|thorough) (explanation|answer|response)\b",
                    r"(?i)\bdo not (summarize|abbreviate|truncate)\b",
                    r"(?i)\bwrite (a |an )?(long|lengthy|extensive)\b",
                ]
            ),
            Self::Concise => static_regex_set!(
                CONCISE,
                [
                    r"(?i)\bbe (very |extremely )?(concise|brief|terse)\b",
                    r"(?i)\bkeep it (short|brief)\b",
                    r"(?i)\bin (one|a single|1)\s+(sentence|word|line)\b",
                    r"(?i)\bno more than \d+\s+(words?|sentences?|characters?)\b",
                    r"(?i)\bdo not (elaborate|explain)\b",
                    r"(?i)\bshort(est)? (possible )?answer\b",
                ]
            ),
            Self::JsonOnly => static_regex_set!(
                JSON_ONLY,
                [
                    r"(?i)\bonly (valid |raw )?json\b",
                    r"(?i)\brespond (only )?(with|in) json\b",
                    r"(?i)\boutput (must be |should be )?(valid )?json\b",
                    r"(?i)\bno (prose|text|commentary|explanation) (outside|besides|other than) (the )?json\b",
                    r"(?i)\bdo not include any (text|prose|explanation) (before|after|outside)\b",
                ]
            ),
            Self::Explanatory => static_regex_set!(
                EXPLANATORY,
                [
                    r"(?i)\bexplain your (reasoning|thinking|thought process)\b",
                    r"(?i)\bshow your work\b",
                    r"(?i)\binclude (an? )?(explanation|rationale|justification)\b",
                    r"(?i)\bwalk me through\b",
                    r"(?i)\bthink (step by step|out loud)\b",
                ]
            ),
        }
    }

    /// Returns every stable name used in diagnostics (not part of the
    /// wire format).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Concise => "concise",
            Self::JsonOnly => "json_only",
            Self::Explanatory => "explanatory",
        }
    }
}

/// Pairs of categories that are considered directly conflicting when both
/// match somewhere in the same text (spec.md §4.6 step 1).
pub const CONFLICT_PAIRS: &[(PatternCategory, PatternCategory)] = &[
    (PatternCategory::Verbose, PatternCategory::Concise),
    (PatternCategory::JsonOnly, PatternCategory::Explanatory),
];

/// Returns the byte-offset spans of every pattern match for `category` in
/// `text`, in the order the underlying regex set is defined.
#[must_use]
pub fn find_matches(category: PatternCategory, text: &str) -> Vec<(usize, usize)> {
    category
        .patterns()
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect()
}
