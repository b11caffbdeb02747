//! Text utilities shared across rules: extraction, normalization, preview
//! snippets, and id generation (spec.md §4.1).

pub mod extract;
pub mod ids;
pub mod normalize;
pub mod preview;

pub use extract::{extract_text, get_current_prompt, get_history, join_messages};
pub use ids::{create_issue_id, create_trace_id};
pub use normalize::{normalize_noun, normalize_phrase};
pub use preview::{create_preview, create_preview_default, DEFAULT_PREVIEW_RADIUS};
