//! Search index provider trait definition.
//!
//! This module defines the contract of the external search backend. The gateway
//! never tokenizes, ranks or stores anything itself; it only shapes requests to
//! fit the limits a provider declares.

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::{BackendLimits, Document, SearchOptions};

/// Abstracts the underlying search backend (OpenSearch, in-memory, etc.).
///
/// Implementations are injected into `SearchIndexService`. Every call is
/// addressed to a named index and is expected to respect `limits()`: the
/// service never sends more than `max_documents_per_call` items in one call.
///
/// Implementations must report backend signals through the matching
/// `SearchIndexError` variant:
///
/// * `PutError` / `DeleteError` / `QueryError` - the backend rejected the call
/// * `DeadlineExceeded` - the call did not finish in time
/// * `QuotaExceeded` - the backend will refuse further calls for now
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// The limits this backend declares.
    fn limits(&self) -> BackendLimits;

    /// Ensure the named index exists, creating it if necessary.
    ///
    /// Called during application startup for the configured index.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Store documents, replacing any existing document with the same identifier.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the target index
    /// * `documents` - At most `limits().max_documents_per_call` documents
    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError>;

    /// Remove documents by identifier. Unknown identifiers are not an error.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the target index
    /// * `ids` - At most `limits().max_documents_per_call` identifiers
    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError>;

    /// Run a full-text query and return matching identifiers in relevance order.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to search
    /// * `query` - Free-text query, already sanitized by the caller
    /// * `options` - Result limit and projection
    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<String>, SearchIndexError>;
}
