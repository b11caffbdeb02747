//! Input types: the immutable [`AnalyzeInput`] a caller hands to
//! [`crate::analyze`] (spec.md §3).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The speaker role.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// Conversation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// End-user turn.
    User,
    /// Assistant turn.
    Assistant,
}

/// An attachment used only as antecedent evidence (spec.md §3, §4.5 step 5h).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment MIME-ish type or kind label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Supported template dialects for placeholder detection (spec.md §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateDialect {
    /// `{{var}}` / `{{#block}}`.
    Handlebars,
    /// `{{ var }}` / `{% tag %}`.
    Jinja,
    /// `{{var}}` (handlebars-compatible subset).
    Mustache,
    /// `<%= var %>` / `<% tag %>`.
    Ejs,
}

/// Token-estimation strategy selector (spec.md §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenEstimationMode {
    /// Pick cheap vs exact automatically based on distance to the window.
    Auto,
    /// Always use the cheap 4-chars/token estimate.
    Cheap,
    /// Always use exact BPE tokenization.
    Exact,
    /// Skip token estimation entirely.
    Off,
}

impl Default for TokenEstimationMode {
    fn default() -> Self {
        Self::Auto
    }
}

/// Bounds the antecedent search window for the reference rule (spec.md §3,
/// §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntecedentWindow {
    /// Maximum number of prior messages to search, counting from the tail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<usize>,
    /// Maximum number of bytes of history to search, counting from the tail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
}

/// Per-call configuration (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Rule codes to skip entirely.
    #[serde(default)]
    pub disabled_rules: HashSet<String>,
    /// Token-estimation strategy.
    #[serde(default)]
    pub token_estimation: TokenEstimationMode,
    /// Early-bail character cap for the token rule.
    pub max_chars: usize,
    /// Per-call input token ceiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_input_tokens: Option<usize>,
    /// Per-call estimated-cost ceiling (USD).
    #[serde(rename = "maxCostUSD", skip_serializing_if = "Option::is_none")]
    pub max_cost_usd: Option<f64>,
    /// Additional head nouns to recognize, beyond the built-in taxonomy.
    #[serde(default)]
    pub reference_heads: Vec<String>,
    /// Additional head -> synonym-set mappings, merged with the defaults.
    #[serde(default)]
    pub synonyms: HashMap<String, HashSet<String>>,
    /// Bounds the reference rule's antecedent search scope.
    #[serde(default)]
    pub antecedent_window: AntecedentWindow,
    /// Minimum cosine similarity for embedding-based fulfillment.
    pub similarity_threshold: f64,
    /// Opt-in: use the embedding-similarity fulfillment tier.
    #[serde(default)]
    pub use_semantic_similarity: bool,
    /// Opt-in: use the NLI-entailment fulfillment tier.
    #[serde(default)]
    pub use_nli_entailment: bool,
    /// Opt-in: use embedding similarity to find semantic-opposite conflicts.
    #[serde(default)]
    pub use_semantic_conflict_detection: bool,
    /// Opt-in: use NLI contradiction scoring for conflicts.
    #[serde(default)]
    pub use_nli_conflict_detection: bool,
    /// Similarity ceiling below which a cross-side pair is a semantic
    /// conflict (lower similarity = more conflicting).
    pub conflict_similarity_threshold: f64,
    /// NLI contradiction-score floor for a logical conflict.
    pub conflict_contradiction_threshold: f64,
    /// API key for the cloud pass-through (spec.md §6). Never serialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for the cloud pass-through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            disabled_rules: HashSet::new(),
            token_estimation: TokenEstimationMode::Auto,
            max_chars: 120_000,
            max_input_tokens: None,
            max_cost_usd: None,
            reference_heads: Vec::new(),
            synonyms: HashMap::new(),
            antecedent_window: AntecedentWindow {
                messages: None,
                bytes: None,
            },
            similarity_threshold: 0.6,
            use_semantic_similarity: false,
            use_nli_entailment: false,
            use_semantic_conflict_detection: false,
            use_nli_conflict_detection: false,
            conflict_similarity_threshold: 0.3,
            conflict_contradiction_threshold: 0.7,
            api_key: None,
            api_base_url: None,
        }
    }
}

impl AnalyzeOptions {
    /// True when any of the model-assisted tiers are requested.
    #[must_use]
    pub const fn wants_model_assist(&self) -> bool {
        self.use_semantic_similarity
            || self.use_nli_entailment
            || self.use_semantic_conflict_detection
            || self.use_nli_conflict_detection
    }

    /// True when `code` (as a spec.md stable string, e.g. `"TOKEN_OVERAGE"`)
    /// has been disabled by the caller.
    #[must_use]
    pub fn is_disabled(&self, code: &str) -> bool {
        self.disabled_rules.contains(code)
    }
}

/// The immutable input to [`crate::analyze`] (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeInput {
    /// A single-string prompt. Mutually usable alongside `messages`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// An ordered multi-turn message list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// Optional JSON-Schema-7 object the caller wants the model to honor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
    /// Optional target model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Template dialect; auto-detected from prompt syntax when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dialect: Option<TemplateDialect>,
    /// Attachments usable only as antecedent evidence.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Per-call configuration.
    #[serde(default)]
    pub options: AnalyzeOptions,
}

impl AnalyzeInput {
    /// True when neither `prompt` nor `messages` was supplied (spec.md §6:
    /// "Missing both ... yields an empty report with only `meta`
    /// populated").
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.messages.as_ref().is_none_or(Vec::is_empty)
    }
}
