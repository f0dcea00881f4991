//! # Query Errors
//!
//! Compile-time errors for query expressions. Every variant maps to a
//! client error; messages identify the offending clause.

use thiserror::Error;

/// Result type for query compilation
pub type QueryResult<T> = Result<T, QueryError>;

/// Query compilation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Root key is not a string
    #[error("Unexpected field: '{0}' ; query root fields should be strings")]
    UnexpectedField(String),

    /// Root key starts with ':' but names no known function
    #[error("Unknown query function: '{0}'")]
    UnknownFunction(String),

    /// Operator mapping holds a key that is not a known operator
    #[error("Unknown operator: '{operator}' (field '{field}')")]
    UnknownOperator { field: String, operator: String },

    /// Operator mapping does not hold exactly one operator
    #[error("Field '{field}' should have exactly one operator, found {count}")]
    OperatorCount { field: String, count: usize },

    /// Query function parameters are missing or mistyped
    #[error("Invalid parameters for query function '{function}': {reason}")]
    InvalidFunctionParameters { function: String, reason: String },

    /// The submitted query is not a mapping
    #[error("Query should be a JSON object, got {0}")]
    NotAnObject(String),
}
