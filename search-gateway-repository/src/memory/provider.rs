//! In-memory provider implementation.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BackendLimits, Document, SearchOptions};

/// Process-local search backend.
///
/// Documents live in a per-index ordered map. A document matches a query when
/// every query token appears among the document's tokens, compared
/// case-insensitively; results come back in identifier order. Calls larger than
/// the declared `max_documents_per_call` are rejected the way a hosted backend
/// would reject them.
///
/// # Example
///
/// ```ignore
/// let provider = InMemoryProvider::new();
/// provider.put_documents("cats", &[Document::new("Garfield", "Loves lasagna.")]).await?;
/// assert_eq!(provider.document_count("cats").await, 1);
/// ```
pub struct InMemoryProvider {
    indexes: RwLock<HashMap<String, BTreeMap<String, String>>>,
    limits: BackendLimits,
}

impl InMemoryProvider {
    /// Create an empty provider with the default backend limits.
    pub fn new() -> Self {
        Self::with_limits(BackendLimits::default())
    }

    /// Create an empty provider declaring custom limits.
    pub fn with_limits(limits: BackendLimits) -> Self {
        Self {
            indexes: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// Number of documents stored in `index`.
    pub async fn document_count(&self, index: &str) -> usize {
        self.indexes
            .read()
            .await
            .get(index)
            .map_or(0, |documents| documents.len())
    }

    /// Identifiers stored in `index`, in order.
    pub async fn document_ids(&self, index: &str) -> Vec<String> {
        self.indexes
            .read()
            .await
            .get(index)
            .map(|documents| documents.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_call_size(&self, size: usize) -> Result<(), String> {
        if size > self.limits.max_documents_per_call {
            return Err(format!(
                "{} items exceed the per-call maximum of {}",
                size, self.limits.max_documents_per_call
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn validate_index_name(index: &str) -> Result<(), SearchIndexError> {
    if index.is_empty() {
        return Err(SearchIndexError::validation("Index name cannot be empty"));
    }
    Ok(())
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    fn limits(&self) -> BackendLimits {
        self.limits
    }

    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        validate_index_name(index)?;
        self.indexes
            .write()
            .await
            .entry(index.to_string())
            .or_default();
        Ok(())
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        validate_index_name(index)?;
        self.check_call_size(documents.len())
            .map_err(SearchIndexError::put)?;

        let mut indexes = self.indexes.write().await;
        let stored = indexes.entry(index.to_string()).or_default();
        for document in documents {
            stored.insert(document.id.clone(), document.value.clone());
        }

        debug!(index = %index, count = documents.len(), "Documents stored in memory");
        Ok(())
    }

    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        validate_index_name(index)?;
        self.check_call_size(ids.len())
            .map_err(SearchIndexError::delete)?;

        if let Some(stored) = self.indexes.write().await.get_mut(index) {
            for id in ids {
                stored.remove(id);
            }
        }

        debug!(index = %index, count = ids.len(), "Documents removed from memory");
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<String>, SearchIndexError> {
        validate_index_name(index)?;

        let terms: HashSet<String> = tokenize(query).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let indexes = self.indexes.read().await;
        let Some(stored) = indexes.get(index) else {
            return Ok(Vec::new());
        };

        Ok(stored
            .iter()
            .filter(|(_, value)| {
                let tokens: HashSet<String> = tokenize(value).collect();
                terms.iter().all(|term| tokens.contains(term))
            })
            .map(|(id, _)| id.clone())
            .take(options.limit)
            .collect())
    }
}
