//! Issue representation: the unit finding emitted by a rule.
//!
//! An [`Issue`] carries a stable code, severity, human detail, structured
//! evidence, a scope pinning it to the prompt or a specific message, and a
//! confidence level. See spec.md §3 for the field contract and invariants.

use serde::{Deserialize, Serialize};

/// Stable machine-readable finding codes.
///
/// This is the SDK superset named in spec.md §9 Open Questions: the engine
/// and the (out-of-scope) SDK both define `IssueCode`, and the SDK's extra
/// variants (`PII_DETECTED`, `SECURITY_THREAT`, `OUT_OF_CONTEXT`) are
/// recognized here in full even though no rule in this crate currently
/// emits `OUT_OF_CONTEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCode {
    /// A template placeholder (e.g. `{{name}}`) was never substituted.
    #[serde(rename = "MISSING_PLACEHOLDER")]
    MissingPlaceholder,
    /// A definite/deictic/forward reference lacks an antecedent.
    #[serde(rename = "MISSING_REFERENCE")]
    MissingReference,
    /// Two or more instructions in the prompt contradict each other.
    #[serde(rename = "CONFLICTING_INSTRUCTION")]
    ConflictingInstruction,
    /// A JSON schema was supplied but the prompt risks not honoring it.
    #[serde(rename = "SCHEMA_RISK")]
    SchemaRisk,
    /// The supplied JSON schema is structurally invalid.
    #[serde(rename = "INVALID_SCHEMA")]
    InvalidSchema,
    /// Estimated input tokens exceed a cap or the model's context window.
    #[serde(rename = "TOKEN_OVERAGE")]
    TokenOverage,
    /// Likely personally identifiable information was found in the text.
    #[serde(rename = "PII_DETECTED")]
    PiiDetected,
    /// Likely prompt-injection or other security-relevant phrasing.
    #[serde(rename = "SECURITY_THREAT")]
    SecurityThreat,
    /// SDK-only code recognized for serialization compatibility; no rule in
    /// this engine emits it (spec.md §9 Open Questions).
    #[serde(rename = "OUT_OF_CONTEXT")]
    OutOfContext,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

/// Confidence that a finding is correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Low confidence.
    Low,
    /// Medium confidence.
    Medium,
    /// High confidence.
    High,
}

impl Confidence {
    /// Drops this confidence by one level, floored at `Low`.
    ///
    /// Used by the reference rule's confidence-penalty rule (spec.md §4.5
    /// step 8: "if a resolution carried a confidence penalty, drop one
    /// level").
    #[must_use]
    pub const fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

/// Which scope of text an issue's byte offsets refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Scope {
    /// Offsets are into the single `prompt` string.
    #[serde(rename = "prompt")]
    Prompt,
    /// Offsets are into `messages[messageIndex].content`.
    #[serde(rename = "messages")]
    Messages {
        /// Index of the referenced message.
        #[serde(rename = "messageIndex")]
        message_index: usize,
    },
}

/// A single occurrence of a finding within its scope.
///
/// `start == end == -1` is the sentinel for a logical (non-positional)
/// finding (spec.md §3 invariant 2), e.g. "deictic cue present".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// The literal matched text, if any.
    pub text: String,
    /// Byte offset start (or -1 for a logical finding).
    pub start: i64,
    /// Byte offset end (or -1 for a logical finding).
    pub end: i64,
    /// Canonical evidence context window (see [`crate::text::create_preview`]).
    pub preview: String,
    /// Index of the message this occurrence belongs to, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_index: Option<usize>,
    /// Free-form categorization bucket (e.g. "verbosity", "format").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// How this candidate's antecedent was resolved, if resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionMethod>,
    /// Fulfillment verdict, when the hierarchical checker was consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_status: Option<FulfillmentStatus>,
    /// Which fulfillment tier produced the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_method: Option<FulfillmentMethod>,
    /// Fulfillment confidence in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_confidence: Option<f64>,
    /// The head noun / term this occurrence concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    /// For conflict pairs, the text of the paired (opposing) occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_with: Option<String>,
}

impl Occurrence {
    /// Creates a positional occurrence.
    #[must_use]
    pub fn positional(text: impl Into<String>, start: usize, end: usize, preview: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            #[allow(clippy::cast_possible_wrap)]
            start: start as i64,
            #[allow(clippy::cast_possible_wrap)]
            end: end as i64,
            preview: preview.into(),
            message_index: None,
            bucket: None,
            resolution: None,
            fulfillment_status: None,
            fulfillment_method: None,
            fulfillment_confidence: None,
            term: None,
            paired_with: None,
        }
    }

    /// Creates the sentinel logical (non-positional) occurrence used for
    /// findings like "deictic cue present" (spec.md §3 invariant 2).
    #[must_use]
    pub fn logical(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: -1,
            end: -1,
            preview: String::new(),
            message_index: None,
            bucket: None,
            resolution: None,
            fulfillment_status: None,
            fulfillment_method: None,
            fulfillment_confidence: None,
            term: None,
            paired_with: None,
        }
    }

    /// True when this occurrence is the `start == end == -1` sentinel.
    #[must_use]
    pub const fn is_logical(&self) -> bool {
        self.start == -1 && self.end == -1
    }
}

/// How an antecedent candidate was resolved, per spec.md §4.5 step 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    /// Exact head match in history.
    Exact,
    /// Exact head match earlier in the current message.
    ExactInCurrent,
    /// Synonym match in history.
    Synonym,
    /// Synonym match earlier in the current message.
    SynonymInCurrent,
    /// Bare mention of the head elsewhere in windowed history.
    Memory,
    /// Bare mention of a synonym elsewhere in windowed history.
    SynonymMemory,
    /// Bare mention earlier in the current message (prompt-only inputs).
    BareInCurrent,
    /// Resolved via attachment name/type.
    Attachment,
    /// Resolved by the hierarchical fulfillment checker's pattern tier.
    Pattern,
    /// Resolved by the fulfillment checker's embedding-similarity tier.
    SemanticSimilarity,
    /// Resolved by the fulfillment checker's NLI-entailment tier.
    NliEntailment,
}

/// Fulfillment verdict for a single reference/evidence pair (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// The reference has a matching antecedent.
    Fulfilled,
    /// The reference has no matching antecedent.
    Unfulfilled,
    /// The checker could not decide confidently.
    Uncertain,
}

/// Which fulfillment tier produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FulfillmentMethod {
    /// Pattern/lexical tier.
    Pattern,
    /// Embedding cosine-similarity tier.
    SemanticSimilarity,
    /// NLI-entailment tier.
    NliEntailment,
    /// At least two tiers independently crossed their thresholds.
    Combined,
    /// No tier was able to produce a verdict.
    None,
}

/// Structured evidence: a per-unique-text summary plus individual
/// occurrences. Either this or a flat list of strings may back an issue
/// (spec.md §3: "evidence (either a flat list of strings or a structured
/// ...)").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredEvidence {
    /// Per-unique-text tally.
    pub summary: Vec<EvidenceSummaryEntry>,
    /// Individual occurrences, in ascending document order.
    pub occurrences: Vec<Occurrence>,
    /// Byte offset of the earliest non-sentinel occurrence, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen_at: Option<i64>,
}

/// One entry in [`StructuredEvidence::summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummaryEntry {
    /// The unique text (e.g. a variable name or "the report").
    pub text: String,
    /// Number of occurrences of this text.
    pub count: usize,
}

/// Evidence backing an issue: either a flat list of strings or the richer
/// structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    /// A flat list of evidence strings.
    Flat(Vec<String>),
    /// Structured summary + occurrences.
    Structured(StructuredEvidence),
}

impl Evidence {
    /// Byte-offset bounds of every non-sentinel occurrence in this
    /// evidence, used to validate spec.md §3 invariant 2.
    #[must_use]
    pub fn occurrence_bounds(&self) -> Vec<(i64, i64)> {
        match self {
            Self::Flat(_) => Vec::new(),
            Self::Structured(s) => s.occurrences.iter().map(|o| (o.start, o.end)).collect(),
        }
    }
}

/// A single diagnostic finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable, unique-within-report identifier.
    pub id: String,
    /// Finding code.
    pub code: IssueCode,
    /// Severity.
    pub severity: Severity,
    /// Human-readable detail string.
    pub detail: String,
    /// Evidence backing the finding.
    pub evidence: Evidence,
    /// Where in the input this finding applies.
    pub scope: Scope,
    /// Confidence that this finding is correct.
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_code_serde_roundtrip() {
        let codes = [
            IssueCode::MissingPlaceholder,
            IssueCode::MissingReference,
            IssueCode::ConflictingInstruction,
            IssueCode::SchemaRisk,
            IssueCode::InvalidSchema,
            IssueCode::TokenOverage,
            IssueCode::PiiDetected,
            IssueCode::SecurityThreat,
            IssueCode::OutOfContext,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let back: IssueCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, back);
        }
    }

    #[test]
    fn test_issue_code_stable_strings() {
        assert_eq!(
            serde_json::to_string(&IssueCode::MissingPlaceholder).unwrap(),
            "\"MISSING_PLACEHOLDER\""
        );
        assert_eq!(
            serde_json::to_string(&IssueCode::OutOfContext).unwrap(),
            "\"OUT_OF_CONTEXT\""
        );
    }

    #[test]
    fn test_confidence_downgrade() {
        assert_eq!(Confidence::High.downgrade(), Confidence::Medium);
        assert_eq!(Confidence::Medium.downgrade(), Confidence::Low);
        assert_eq!(Confidence::Low.downgrade(), Confidence::Low);
    }

    #[test]
    fn test_occurrence_logical_sentinel() {
        let occ = Occurrence::logical("deictic cue present");
        assert!(occ.is_logical());
        assert_eq!(occ.start, -1);
        assert_eq!(occ.end, -1);
    }

    #[test]
    fn test_occurrence_positional_not_logical() {
        let occ = Occurrence::positional("the report", 10, 20, "...the report...");
        assert!(!occ.is_logical());
        assert_eq!(occ.start, 10);
        assert_eq!(occ.end, 20);
    }

    #[test]
    fn test_evidence_untagged_flat_roundtrip() {
        let ev = Evidence::Flat(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }

    #[test]
    fn test_evidence_untagged_structured_roundtrip() {
        let ev = Evidence::Structured(StructuredEvidence {
            summary: vec![EvidenceSummaryEntry {
                text: "customer_name".to_string(),
                count: 1,
            }],
            occurrences: vec![Occurrence::positional("customer_name", 6, 21, "...")],
            first_seen_at: Some(6),
        });
        let json = serde_json::to_string(&ev).unwrap();
        let back: Evidence = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn test_scope_serde() {
        let scope = Scope::Messages { message_index: 2 };
        let json = serde_json::to_string(&scope).unwrap();
        assert!(json.contains("\"messageIndex\":2"));
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(scope, back);
    }
}
