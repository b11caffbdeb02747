//! Data model for LangPatrol: the immutable [`AnalyzeInput`] and the
//! mutable [`Report`] accumulator rules write into (spec.md §3).

pub mod input;
pub mod issue;
pub mod report;
pub mod suggestion;

pub use input::{
    AnalyzeInput, AnalyzeOptions, AntecedentWindow, Attachment, Message, Role, TemplateDialect,
    TokenEstimationMode,
};
pub use issue::{
    Confidence, Evidence, EvidenceSummaryEntry, FulfillmentMethod, FulfillmentStatus, Issue,
    IssueCode, Occurrence, ResolutionMethod, Scope, Severity, StructuredEvidence,
};
pub use report::{Cost, Meta, Report, Summary};
pub use suggestion::{Suggestion, SuggestionKind};
