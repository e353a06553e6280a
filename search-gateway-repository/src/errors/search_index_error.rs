//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! covering both backend signals (put/delete/query failures, deadlines, quota)
//! and gateway-side errors (validation, safety limit).

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and `SearchIndexService`. Providers map
/// their native failures onto these variants so the gateway can apply one policy
/// regardless of backend: deadline and generic put/delete errors are transient,
/// quota exhaustion aborts the remaining work.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., invalid index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The backend rejected or failed a put call.
    #[error("Put error: {0}")]
    PutError(String),

    /// The backend rejected or failed a delete call.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// The backend could not evaluate a search query.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The backend call did not complete before its deadline.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The backend quota is exhausted; further calls will fail as well.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Failed to parse response from search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Number of items in a single put/delete exceeds the safety limit.
    #[error("Batch of {provided} items exceeds the safety limit of {max}")]
    SafetyLimitExceeded { provided: usize, max: usize },
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a put error.
    pub fn put(msg: impl Into<String>) -> Self {
        Self::PutError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a deadline exceeded error.
    pub fn deadline_exceeded(msg: impl Into<String>) -> Self {
        Self::DeadlineExceeded(msg.into())
    }

    /// Create a quota exceeded error.
    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a safety limit exceeded error.
    pub fn safety_limit_exceeded(provided: usize, max: usize) -> Self {
        Self::SafetyLimitExceeded { provided, max }
    }

    /// Whether this error means every subsequent backend call will fail too.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Whether the backend gave up on the call because its deadline passed.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_classification() {
        assert!(SearchIndexError::quota_exceeded("daily limit").is_quota_exceeded());
        assert!(!SearchIndexError::put("boom").is_quota_exceeded());
        assert!(!SearchIndexError::deadline_exceeded("slow").is_quota_exceeded());
    }

    #[test]
    fn test_deadline_classification() {
        assert!(SearchIndexError::deadline_exceeded("slow").is_deadline_exceeded());
        assert!(!SearchIndexError::delete("boom").is_deadline_exceeded());
    }

    #[test]
    fn test_safety_limit_message() {
        let err = SearchIndexError::safety_limit_exceeded(15001, 15000);
        assert_eq!(
            err.to_string(),
            "Batch of 15001 items exceeds the safety limit of 15000"
        );
    }
}
