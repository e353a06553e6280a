//! Search index service implementation.
//!
//! This module provides the batch gateway between the HTTP surface and the
//! search backend. Puts and deletes are checked against the safety limit, split
//! into chunks the backend accepts, dispatched concurrently and aggregated.
//! Searches are bounded and sanitized, and never fail towards the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, warn};

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BackendLimits, BatchOperationSummary, ChunkOutcome, Document, SearchOptions};
use crate::validation::strip_relational_operators_default;

/// Kind of batched mutation, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchOperation {
    Put,
    Delete,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("put"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// The main service for interacting with the search index.
///
/// This is the high-level API the HTTP layer uses. It enforces the safety limit,
/// sizes chunks from the provider's declared limits and applies the failure
/// policy: a chunk that fails with a generic error or a deadline is logged and
/// skipped, while quota exhaustion abandons all remaining chunks.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_gateway_repository::{Document, InMemoryProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = SearchIndexService::new(Arc::new(InMemoryProvider::new()));
///
/// service
///     .put("cats", &[Document::new("Doraemon", "Robotic cat from the future.")])
///     .await?;
/// assert_eq!(service.search("cats", "robotic").await, vec!["Doraemon".to_string()]);
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with the default safety limit.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Arc<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// The limits declared by the underlying provider.
    pub fn limits(&self) -> BackendLimits {
        self.provider.limits()
    }

    /// Ensure the named index exists on the backend.
    pub async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        self.provider.ensure_index_exists(index).await
    }

    /// Reject requests larger than the safety limit before anything is sent.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if size > self.config.safety_limit {
            return Err(SearchIndexError::safety_limit_exceeded(
                size,
                self.config.safety_limit,
            ));
        }
        Ok(())
    }

    /// Put documents in the search index.
    ///
    /// A document with an identifier that already exists replaces it.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-chunk accounting; partial failures are
    ///   reported here, not as an error
    /// * `Err(SearchIndexError::SafetyLimitExceeded)` - If more documents than the
    ///   safety limit were given; nothing was sent
    pub async fn put(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.validate_batch_size(documents.len())?;

        Ok(self
            .run_chunks(BatchOperation::Put, index, documents, |chunk| {
                self.provider.put_documents(index, chunk)
            })
            .await)
    }

    /// Delete documents with the given identifiers from the search index.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-chunk accounting; partial failures are
    ///   reported here, not as an error
    /// * `Err(SearchIndexError::SafetyLimitExceeded)` - If more identifiers than the
    ///   safety limit were given; nothing was sent
    pub async fn delete(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.validate_batch_size(ids.len())?;

        Ok(self
            .run_chunks(BatchOperation::Delete, index, ids, |chunk| {
                self.provider.delete_documents(index, chunk)
            })
            .await)
    }

    /// Return identifiers of documents matching a global search for `query`.
    ///
    /// Empty and over-long queries return no results without contacting the
    /// backend. Relational operators are replaced with spaces so the query is
    /// always free text. Backend failures are logged and yield no results.
    pub async fn search(&self, index: &str, query: &str) -> Vec<String> {
        let limits = self.provider.limits();
        let query = query.trim();
        let length = query.chars().count();
        if length == 0 || length > limits.max_query_length {
            debug!(
                index = %index,
                length = length,
                max_length = limits.max_query_length,
                "Skipping empty or over-long query"
            );
            return Vec::new();
        }

        let query = strip_relational_operators_default(query);
        let options = SearchOptions {
            limit: limits.max_documents_returned_per_search,
            ids_only: true,
        };

        match self.provider.search(index, &query, &options).await {
            Ok(ids) => ids,
            Err(SearchIndexError::DeadlineExceeded(msg)) => {
                error!(index = %index, error = %msg, "Deadline exceeded for search backend search call");
                Vec::new()
            }
            Err(SearchIndexError::QuotaExceeded(msg)) => {
                error!(index = %index, error = %msg, "Quota exceeded for search backend search call");
                Vec::new()
            }
            Err(e) => {
                debug!(index = %index, error = %e, "Search backend rejected query");
                Vec::new()
            }
        }
    }

    /// Split `items` into backend-sized chunks, dispatch them concurrently and
    /// aggregate the outcomes.
    ///
    /// On quota exhaustion the loop stops and the chunk futures still pending are
    /// dropped, which cancels them. Calls already transmitted may still be applied
    /// by the backend.
    async fn run_chunks<'a, T, F, Fut>(
        &self,
        operation: BatchOperation,
        index: &str,
        items: &'a [T],
        call: F,
    ) -> BatchOperationSummary
    where
        F: Fn(&'a [T]) -> Fut,
        Fut: Future<Output = Result<(), SearchIndexError>>,
    {
        if items.is_empty() {
            return BatchOperationSummary::default();
        }

        let chunk_size = self.provider.limits().max_documents_per_call.max(1);
        let mut pending: FuturesUnordered<_> = items
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let request = call(chunk);
                async move { (chunk_index, chunk.len(), request.await) }
            })
            .collect();

        let mut summary = BatchOperationSummary::new(items.len(), pending.len());
        debug!(
            operation = %operation,
            index = %index,
            total = summary.total,
            chunks = summary.chunks,
            "Dispatching batch"
        );

        while let Some((chunk_index, chunk_len, result)) = pending.next().await {
            match ChunkOutcome::from(result) {
                ChunkOutcome::Applied => {
                    summary.applied_chunks += 1;
                    summary.applied_items += chunk_len;
                }
                ChunkOutcome::Failed(e) => {
                    summary.failed_chunks += 1;
                    if e.is_deadline_exceeded() {
                        error!(
                            operation = %operation,
                            index = %index,
                            chunk_index = chunk_index,
                            chunk_len = chunk_len,
                            error = %e,
                            "Deadline exceeded for search backend {} call",
                            operation
                        );
                    } else {
                        error!(
                            operation = %operation,
                            index = %index,
                            chunk_index = chunk_index,
                            chunk_len = chunk_len,
                            error = %e,
                            "Unable to {} documents in search index",
                            operation
                        );
                    }
                }
                ChunkOutcome::QuotaExhausted(e) => {
                    summary.aborted = true;
                    error!(
                        operation = %operation,
                        index = %index,
                        total = summary.total,
                        error = %e,
                        "Quota exceeded for search backend {} {} calls",
                        summary.total,
                        operation
                    );
                    break;
                }
            }
        }

        if summary.aborted {
            warn!(
                operation = %operation,
                index = %index,
                unresolved_chunks = summary.unresolved_chunks(),
                "Abandoned remaining chunks after quota exhaustion"
            );
        } else {
            debug!(
                operation = %operation,
                index = %index,
                applied_chunks = summary.applied_chunks,
                failed_chunks = summary.failed_chunks,
                "Batch completed"
            );
        }

        summary
    }
}
