//! Query error types
//!
//! Defines all error conditions that can occur while answering queries.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Search word was empty
    #[error("Search word should be correctly specified")]
    EmptyWord,

    /// Tag was empty
    #[error("Tag should be correctly specified")]
    EmptyTag,

    /// Scope was not YYYY, YYYYMM or YYYY/MM
    #[error("Date should be either one of \"YYYY\" or \"YYYYMM\": {0}")]
    InvalidScope(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

impl QueryError {
    /// Whether the caller can fix this by changing the input
    pub fn is_usage(&self) -> bool {
        !matches!(self, QueryError::Storage(_))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
