//! Error types for building and serializing query trees.
//!
//! Every failure in this crate is local and synchronous: a builder precondition
//! that was not met, a value the wire format cannot represent, or a
//! configuration that could not be loaded. Errors carry a code for
//! programmatic handling plus optional context and suggestions.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: E{category}{number}
//! - 1xxx: Construction errors (invalid filter, invalid query)
//! - 6xxx: Serialization errors
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use esdsl_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::invalid_filter("range bound set without a field");
//! assert_eq!(err.code, ErrorCode::InvalidFilter);
//! assert_eq!(err.code.code(), "E1001");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query building and serialization.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Construction errors (1xxx)
    /// Invalid filter clause (E1001).
    InvalidFilter = 1001,
    /// Invalid query clause (E1002).
    InvalidQuery = 1002,
    /// A filter was attached to a node that carries no query (E1003).
    FilterWithoutQuery = 1003,

    // Serialization errors (6xxx)
    /// A value could not be represented on the wire (E6001).
    SerializationError = 6001,
    /// A value could not be represented as a JSON number (E6002).
    InvalidNumber = 6002,

    // Configuration errors (7xxx)
    /// Invalid configuration (E7001).
    InvalidConfiguration = 7001,

    // Internal errors (9xxx)
    /// Internal error (E9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "E1001").
    pub fn code(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidFilter => "Invalid filter clause",
            Self::InvalidQuery => "Invalid query clause",
            Self::FilterWithoutQuery => "Filter attached without a query",
            Self::SerializationError => "Serialization error",
            Self::InvalidNumber => "Invalid number",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The clause being built or serialized (e.g. "range", "filtered").
    pub clause: Option<String>,
    /// The document field involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building or serializing a query tree.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the clause the error refers to.
    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.context.clause = Some(clause.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an invalid filter error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidFilter,
            format!("Invalid filter: {}", message.into()),
        )
    }

    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidQuery,
            format!("Invalid query: {}", message.into()),
        )
    }

    /// Create the error raised when a filter-only query node is rejected.
    pub fn filter_without_query() -> Self {
        Self::new(
            ErrorCode::FilterWithoutQuery,
            "A filter is attached to a query node that has no query clause".to_string(),
        )
        .with_clause("filtered")
        .with_suggestion("Add a query clause, e.g. .all() to match every document")
        .with_help("Set FilterOnlyPolicy::Drop to keep the legacy behaviour of dropping the filter")
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message.into())
    }

    /// Create an error for a number the wire format cannot carry.
    pub fn invalid_number(field: impl Into<String>, value: f64) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::InvalidNumber,
            format!("Value {} for {} is not a finite number", value, field),
        )
        .with_field(&field)
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration: {}", message.into()),
        )
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message.into()))
    }

    // ============== Error Checks ==============

    /// Check if this error comes from a builder precondition.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidFilter | ErrorCode::InvalidQuery | ErrorCode::FilterWithoutQuery
        )
    }

    /// Check if this is a serialization error.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::SerializationError | ErrorCode::InvalidNumber
        )
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        self.code == ErrorCode::InvalidConfiguration
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref clause) = self.context.clause {
            output.push_str(&format!("  → Clause: {}\n", clause));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::serialization(err.to_string()).with_source(err)
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::InvalidFilter.code(), "E1001");
        assert_eq!(ErrorCode::SerializationError.code(), "E6001");
        assert_eq!(ErrorCode::InvalidConfiguration.code(), "E7001");
    }

    #[test]
    fn test_filter_without_query_error() {
        let err = QueryError::filter_without_query();
        assert!(err.is_construction_error());
        assert_eq!(err.context.clause, Some("filtered".to_string()));
        assert!(!err.context.suggestions.is_empty());
    }

    #[test]
    fn test_invalid_number_error() {
        let err = QueryError::invalid_number("lat", f64::NAN);
        assert!(err.is_serialization_error());
        assert_eq!(err.context.field, Some("lat".to_string()));
        assert!(err.to_string().starts_with("[E6002]"));
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::invalid_filter("empty field name")
            .with_clause("range")
            .with_suggestion("Select a field before setting bounds");

        let output = err.display_full();
        assert!(output.contains("E1001"));
        assert!(output.contains("Clause: range"));
        assert!(output.contains("Suggestions"));
    }

    #[test]
    fn test_error_macro() {
        let err = query_error!(
            ErrorCode::InvalidQuery,
            "empty query string",
            with_clause = "query_string",
            with_suggestion = "Use .all() to match every document"
        );

        assert_eq!(err.code, ErrorCode::InvalidQuery);
        assert_eq!(err.context.clause, Some("query_string".to_string()));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: QueryError = json_err.into();
        assert_eq!(err.code, ErrorCode::SerializationError);
        assert!(std::error::Error::source(&err).is_some());
    }
}
