//! Static lexical tables used by the reference and conflict rules:
//! instruction-style patterns, head-noun taxonomy, and forward-reference
//! cue detection (spec.md §4.5, §4.6).

pub mod nouns;
pub mod patterns;
pub mod references;

pub use nouns::{are_synonyms, default_synonyms, is_reference_head, merge_synonyms, DEFAULT_REFERENCE_HEADS};
pub use patterns::{find_matches, PatternCategory, CONFLICT_PAIRS};
pub use references::{deictic_cue_present, detect_forward_references, CandidateKind, ReferenceCandidate};
