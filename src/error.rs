//! Error types for LangPatrol operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! all engine operations: schema validation, tokenization, rule execution,
//! and the CLI layer.

use thiserror::Error;

/// Result type alias for LangPatrol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the LangPatrol engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Schema-related errors (malformed JSON Schema input).
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Tokenizer-related errors.
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// Model-adapter errors (embedding or entailment backend).
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Cloud pass-through errors.
    #[error("cloud error: {0}")]
    Cloud(#[from] CloudError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Invalid state reached only through a programmer error (spec.md §7:
    /// "rules may throw only on impossible preconditions").
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors (invalid `AnalyzeOptions`).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Schema-validation-specific errors.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The caller's `schema` value is not a JSON object.
    #[error("schema root must be an object")]
    RootNotObject,

    /// Failed to parse a schema from a string (CLI/test fixtures only).
    #[error("failed to parse schema JSON: {0}")]
    ParseFailed(String),
}

/// Tokenizer-specific errors.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The exact BPE backend failed to initialize or encode.
    #[error("exact tokenizer unavailable: {reason}")]
    BackendUnavailable {
        /// Reason the backend could not be used.
        reason: String,
    },
}

/// Embedding/entailment adapter errors.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Embedding generation failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Entailment/classification inference failed.
    #[error("entailment error: {0}")]
    Entailment(String),
}

/// Cloud pass-through errors.
#[derive(Error, Debug)]
pub enum CloudError {
    /// No API key configured for a cloud call.
    #[error("missing API key for cloud endpoint")]
    MissingApiKey,

    /// The HTTP request itself failed (network, TLS, timeout).
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The endpoint returned a non-success HTTP status.
    #[error("endpoint returned {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body (or a truncated preview of it).
        body: String,
    },

    /// The response body could not be decoded as the expected type.
    #[error("failed to decode response: {0}")]
    DecodeFailed(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No input files matched the given glob.
    #[error("no files matched: {0}")]
    NoMatches(String),

    /// Failed to read an input file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write output: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailed(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Command(CommandError::ReadFailed {
            path: String::new(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = Error::InvalidState {
            message: "unknown template dialect after detection".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state: unknown template dialect after detection"
        );
    }

    #[test]
    fn test_config_display() {
        let err = Error::Config {
            message: "bad options".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad options");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::RootNotObject;
        assert_eq!(err.to_string(), "schema root must be an object");
    }

    #[test]
    fn test_tokenizer_error_display() {
        let err = TokenizerError::BackendUnavailable {
            reason: "model not bundled".to_string(),
        };
        assert!(err.to_string().contains("model not bundled"));
    }

    #[test]
    fn test_model_error_display() {
        let err = ModelError::Embedding("dimension mismatch".to_string());
        assert!(err.to_string().contains("dimension mismatch"));

        let err = ModelError::Entailment("inference timeout".to_string());
        assert!(err.to_string().contains("inference timeout"));
    }

    #[test]
    fn test_cloud_error_display() {
        let err = CloudError::MissingApiKey;
        assert_eq!(err.to_string(), "missing API key for cloud endpoint");

        let err = CloudError::HttpStatus {
            status: 500,
            body: "internal error".to_string(),
        };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::NoMatches("*.txt".to_string());
        assert!(err.to_string().contains("*.txt"));

        let err = CommandError::ReadFailed {
            path: "/tmp/missing".to_string(),
            reason: "not found".to_string(),
        };
        assert!(err.to_string().contains("/tmp/missing"));
    }

    #[test]
    fn test_error_from_schema() {
        let schema_err = SchemaError::RootNotObject;
        let err: Error = schema_err.into();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_error_from_tokenizer() {
        let tok_err = TokenizerError::BackendUnavailable {
            reason: "x".to_string(),
        };
        let err: Error = tok_err.into();
        assert!(matches!(err, Error::Tokenizer(_)));
    }

    #[test]
    fn test_schema_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: SchemaError = json_err.into();
        assert!(matches!(err, SchemaError::ParseFailed(_)));
    }
}
