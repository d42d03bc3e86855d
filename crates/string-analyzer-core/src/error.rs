//! Error taxonomy shared by the analyzer, store, and query layers.
//!
//! Every variant maps to exactly one client-visible failure class. Backend
//! failures that are not the caller's fault travel as [`Error::Storage`].

use thiserror::Error;

/// Errors produced by String Analyzer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request payload is malformed: missing, empty, or wrongly typed value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record with the same value (and therefore the same hash) already exists.
    #[error("string already exists in the system: {id}")]
    Conflict { id: String },

    /// No record matches the identifier.
    #[error("string not found: {0}")]
    NotFound(String),

    /// A filter parameter could not be parsed.
    #[error("invalid filter criteria: {0}")]
    InvalidCriteria(String),

    /// No natural-language rule matched the query text.
    #[error("unable to parse natural language query: {0}")]
    UnparseableQuery(String),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    pub fn invalid_criteria(message: impl Into<String>) -> Self {
        Error::InvalidCriteria(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
