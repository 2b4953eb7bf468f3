//! Error types for query compilation.
//!
//! Compilation has a single failure kind, [`QueryError::NotSupported`], which
//! carries a human-readable explanation. Schema construction and the bundled
//! parser have their own error types so that callers can tell a broken schema
//! apart from an unsupported query.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// Result alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, QueryError>;

/// The query could not be compiled against the registered schema.
///
/// Compilation is deterministic, so the caller is expected to fix the input
/// and try again; there is nothing to retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query not supported: {0}")]
    NotSupported(String),
}

impl QueryError {
    /// Builds a [`QueryError::NotSupported`] from any displayable reason.
    pub fn not_supported(reason: impl Into<String>) -> Self {
        QueryError::NotSupported(reason.into())
    }

    /// Returns the explanatory text.
    pub fn reason(&self) -> &str {
        match self {
            QueryError::NotSupported(reason) => reason,
        }
    }
}

/// Errors raised while building or loading a field registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A field name or alias is already taken.
    #[error("field name '{name}' is already registered")]
    DuplicateName { name: String },

    /// The definition is internally inconsistent.
    #[error("invalid definition for field '{field}': {message}")]
    InvalidDefinition { field: String, message: String },

    /// The schema document could not be deserialized.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the query text parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        QueryError::NotSupported(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_supported_display() {
        let err = QueryError::not_supported("field 'foo' not recognized");
        assert_eq!(
            err.to_string(),
            "query not supported: field 'foo' not recognized"
        );
        assert_eq!(err.reason(), "field 'foo' not recognized");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: QueryError = ParseError::new("unterminated string", 4).into();
        assert_eq!(
            err,
            QueryError::NotSupported("parse error at position 4: unterminated string".into())
        );
    }
}
