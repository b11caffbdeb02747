//! # langpatrol
//!
//! Static linter for LLM prompts: flags unresolved template placeholders,
//! missing pronoun/noun-phrase antecedents, conflicting style or format
//! instructions, JSON-schema risk, and token/cost overage before a prompt
//! ever reaches a model.
//!
//! The public surface is a single function, [`analyze`], over an
//! immutable [`model::AnalyzeInput`] and returning a [`model::Report`].
//! Everything else — the lexicon tables, the tokenizer, the optional
//! embedding/entailment backends, the cloud pass-through, the CLI — is
//! plumbing in service of that one call.
//!
//! ## Features
//!
//! - **Pattern-based rules**: placeholders, conflicting instructions, PII,
//!   and prompt-injection phrasing, with zero required dependencies.
//! - **Lexical antecedent resolution**: definite-noun-phrase and deictic
//!   reference detection with a synonym-aware resolver.
//! - **Optional model-assisted tiers**: embedding similarity
//!   (`fastembed-embeddings`) and NLI-style entailment (`nli-entailment`)
//!   corroborate the pattern tier rather than replace it.
//! - **Token and cost estimation**: a cheap character-based heuristic, an
//!   exact BPE count (`exact-tokenizer`), and an auto mode that only pays
//!   for the exact count near the model's context window.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

#[cfg(feature = "cloud")]
pub mod cloud;
pub mod cli;
pub mod embedding;
pub mod entailment;
pub mod error;
pub mod fulfillment;
pub mod lexicon;
pub mod model;
pub mod orchestrator;
pub mod rules;
pub mod schema;
pub mod text;
pub mod tokenizer;

pub use error::{Error, Result};
pub use model::{AnalyzeInput, AnalyzeOptions, Report};
pub use orchestrator::analyze;

// Re-export CLI types.
pub use cli::{Cli, Commands, OutputFormat};

// Re-export embedding types.
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{
    cosine_similarity, create_embedder, DEFAULT_DIMENSIONS, Embedder, FallbackEmbedder,
};

// Re-export entailment types.
#[cfg(feature = "nli-entailment")]
pub use entailment::CandleClassifier;
pub use entailment::{create_classifier, Classifier, FallbackClassifier};
