//! Suggestions: advisory strings attached to a report, optionally pointing
//! at the issue that prompted them (spec.md §3, §6).

use serde::{Deserialize, Serialize};

/// Stable suggestion kind strings (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionKind {
    /// Suggest inlining missing context (reference rule).
    #[serde(rename = "ADD_CONTEXT")]
    AddContext,
    /// Suggest tightening a conflicting instruction (conflicts rule).
    #[serde(rename = "TIGHTEN_INSTRUCTION")]
    TightenInstruction,
    /// Suggest enforcing strict JSON output (schema-risk rule).
    #[serde(rename = "ENFORCE_JSON")]
    EnforceJson,
    /// Suggest trimming context to fit a token/cost budget (token rule).
    #[serde(rename = "TRIM_CONTEXT")]
    TrimContext,
}

/// An advisory suggestion, optionally linked to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggestion kind.
    pub kind: SuggestionKind,
    /// Human-readable suggestion text.
    pub text: String,
    /// The issue id this suggestion addresses, if any.
    #[serde(rename = "for", skip_serializing_if = "Option::is_none")]
    pub for_issue: Option<String>,
}

impl Suggestion {
    /// Creates a suggestion linked to an issue.
    #[must_use]
    pub fn for_issue(kind: SuggestionKind, text: impl Into<String>, issue_id: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            for_issue: Some(issue_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_kind_stable_strings() {
        assert_eq!(
            serde_json::to_string(&SuggestionKind::AddContext).unwrap(),
            "\"ADD_CONTEXT\""
        );
        assert_eq!(
            serde_json::to_string(&SuggestionKind::TightenInstruction).unwrap(),
            "\"TIGHTEN_INSTRUCTION\""
        );
        assert_eq!(
            serde_json::to_string(&SuggestionKind::EnforceJson).unwrap(),
            "\"ENFORCE_JSON\""
        );
        assert_eq!(
            serde_json::to_string(&SuggestionKind::TrimContext).unwrap(),
            "\"TRIM_CONTEXT\""
        );
    }

    #[test]
    fn test_suggestion_for_issue() {
        let s = Suggestion::for_issue(SuggestionKind::AddContext, "Inline a summary", "iss-1");
        assert_eq!(s.for_issue.as_deref(), Some("iss-1"));
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"for\":\"iss-1\""));
    }

    #[test]
    fn test_suggestion_without_issue_omits_for() {
        let s = Suggestion {
            kind: SuggestionKind::TrimContext,
            text: "trim it".to_string(),
            for_issue: None,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("\"for\""));
    }
}
