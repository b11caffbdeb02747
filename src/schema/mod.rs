//! JSON-Schema-7 structural validation (spec.md §4.9).

pub mod validate;

pub use validate::{validate, SchemaIssueKeyword, SchemaValidationError};
