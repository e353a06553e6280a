//! Request, limit and outcome types for search index operations.

use serde::{Deserialize, Serialize};

use crate::errors::SearchIndexError;
use crate::validation::MAX_DOCUMENT_ID_LENGTH;

/// Name of the single text field every document is stored under.
pub const TEXT_FIELD_NAME: &str = "t";

/// A document to store in the search index.
///
/// The identifier addresses the document in the index; putting a document with
/// an existing identifier replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The document identifier.
    pub id: String,
    /// The full text of the document.
    pub value: String,
}

impl Document {
    /// Create a document without touching its value.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Create a document whose value is cut to at most `max_chars` characters.
    pub fn truncated(id: impl Into<String>, value: &str, max_chars: usize) -> Self {
        let value = match value.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &value[..byte_index],
            None => value,
        };
        Self::new(id, value)
    }
}

/// Limits declared by a search backend.
///
/// The gateway uses these to size chunks, bound queries and cap search results.
/// The defaults mirror a hosted full-text index with 200 documents per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendLimits {
    /// Maximum number of documents or identifiers accepted by one put/delete call.
    pub max_documents_per_call: usize,
    /// Maximum number of results a single search can return.
    pub max_documents_returned_per_search: usize,
    /// Maximum length of a document identifier, in characters.
    pub max_document_id_length: usize,
    /// Maximum length of a query string, in characters.
    pub max_query_length: usize,
    /// Maximum length of a text field value, in characters.
    pub max_field_value_length: usize,
}

impl Default for BackendLimits {
    fn default() -> Self {
        Self {
            max_documents_per_call: 200,
            max_documents_returned_per_search: 1000,
            max_document_id_length: MAX_DOCUMENT_ID_LENGTH,
            max_query_length: 2000,
            max_field_value_length: 1024 * 1024,
        }
    }
}

/// Options for a single search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of identifiers to return.
    pub limit: usize,
    /// Return identifiers only, without document bodies.
    pub ids_only: bool,
}

/// Outcome of one chunk of a batched put or delete.
#[derive(Debug, Clone)]
pub enum ChunkOutcome {
    /// The backend applied the chunk.
    Applied,
    /// The chunk failed in isolation (generic error or deadline); other chunks proceed.
    Failed(SearchIndexError),
    /// The backend quota is exhausted; the remaining chunks are abandoned.
    QuotaExhausted(SearchIndexError),
}

impl From<Result<(), SearchIndexError>> for ChunkOutcome {
    fn from(result: Result<(), SearchIndexError>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(e) if e.is_quota_exceeded() => Self::QuotaExhausted(e),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Summary of a batched put or delete.
///
/// Callers at the HTTP layer do not surface partial failures; the summary is
/// kept for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOperationSummary {
    /// Total number of items submitted.
    pub total: usize,
    /// Number of chunks the items were split into.
    pub chunks: usize,
    /// Number of chunks the backend applied.
    pub applied_chunks: usize,
    /// Number of chunks that failed and were skipped.
    pub failed_chunks: usize,
    /// Number of items in applied chunks.
    pub applied_items: usize,
    /// Whether quota exhaustion abandoned the remaining chunks.
    pub aborted: bool,
}

impl BatchOperationSummary {
    /// Create an empty summary for `total` items split into `chunks` chunks.
    pub fn new(total: usize, chunks: usize) -> Self {
        Self {
            total,
            chunks,
            ..Self::default()
        }
    }

    /// Number of chunks whose outcome was never observed.
    pub fn unresolved_chunks(&self) -> usize {
        self.chunks - self.applied_chunks - self.failed_chunks
    }
}
