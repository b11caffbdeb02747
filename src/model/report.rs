//! [`Report`]: the mutable accumulator the orchestrator builds during
//! analysis and returns (immutably, conceptually) to the caller
//! (spec.md §3).

use crate::model::issue::{Confidence, Issue, IssueCode};
use crate::model::suggestion::Suggestion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Estimated token-cost facts (spec.md §3, §4.10).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    /// Estimated input tokens.
    pub est_input_tokens: usize,
    /// Estimated cost in USD, when model pricing is known.
    #[serde(rename = "estUSD", skip_serializing_if = "Option::is_none")]
    pub est_usd: Option<f64>,
    /// Raw character count of the extracted text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    /// Which estimation method produced `est_input_tokens`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Per-call metadata sealed onto the report after all rules run
/// (spec.md §3, §4.11).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Total wall-clock time spent analyzing, in milliseconds.
    pub latency_ms: u64,
    /// The resolved model identifier used for window/pricing lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_hint: Option<String>,
    /// Per-rule timing, one entry per *enabled* rule (spec.md §3 invariant 4).
    pub rule_timings: HashMap<String, u64>,
    /// Opaque per-call trace identifier.
    pub trace_id: String,
    /// The resolved model's context window, when a model was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<usize>,
}

/// Tally of issues by code, present only when at least one issue exists
/// (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Exact per-code issue counts (spec.md §3 invariant 3).
    pub issue_counts: HashMap<IssueCode, usize>,
    /// Overall report confidence: `high` whenever any issue exists.
    pub confidence: Confidence,
}

/// The structured diagnostic report returned by [`crate::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Findings, in fixed rule order then document order (spec.md §5).
    pub issues: Vec<Issue>,
    /// Advisory suggestions, possibly empty (spec.md §4.11).
    pub suggestions: Vec<Suggestion>,
    /// Token-cost estimate.
    pub cost: Cost,
    /// Call metadata.
    pub meta: Meta,
    /// Issue tally, present only when `issues` is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl Report {
    /// Creates an empty report ready for rules to mutate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an issue, assigning it an id if it doesn't already have a
    /// non-empty one.
    pub fn push_issue(&mut self, mut issue: Issue) -> String {
        if issue.id.is_empty() {
            issue.id = crate::text::create_issue_id();
        }
        let id = issue.id.clone();
        self.issues.push(issue);
        id
    }

    /// Appends a suggestion.
    pub fn push_suggestion(&mut self, suggestion: Suggestion) {
        self.suggestions.push(suggestion);
    }

    /// Records how long a rule took to run (spec.md §3 invariant 4: every
    /// enabled rule gets an entry, even when it found nothing).
    pub fn record_timing(&mut self, rule: &str, millis: u64) {
        self.meta.rule_timings.insert(rule.to_string(), millis);
    }

    /// Recomputes `summary` from the current `issues`, per spec.md §3
    /// invariant 3. A report with no issues has `summary = None`.
    pub fn seal_summary(&mut self) {
        if self.issues.is_empty() {
            self.summary = None;
            return;
        }
        let mut counts: HashMap<IssueCode, usize> = HashMap::new();
        for issue in &self.issues {
            *counts.entry(issue.code).or_insert(0) += 1;
        }
        self.summary = Some(Summary {
            issue_counts: counts,
            confidence: Confidence::High,
        });
    }

    /// Returns every issue id currently in the report, for suggestion
    /// validation (spec.md §3 invariant 5).
    #[must_use]
    pub fn issue_ids(&self) -> std::collections::HashSet<&str> {
        self.issues.iter().map(|i| i.id.as_str()).collect()
    }
}
