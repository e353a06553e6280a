//! Configuration types for the SearchIndexService.

/// Default maximum number of documents that can be put or deleted in one call.
///
/// Hosted search backends enforce a per-minute write ceiling; requests larger
/// than this are rejected before anything is sent.
pub const DEFAULT_SAFETY_LIMIT: usize = 15000;

/// Configuration for the SearchIndexService.
#[derive(Debug, Clone)]
pub struct SearchIndexServiceConfig {
    /// Maximum number of documents or identifiers allowed in a single put/delete.
    pub safety_limit: usize,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            safety_limit: DEFAULT_SAFETY_LIMIT,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Create a config with a custom safety limit.
    ///
    /// # Arguments
    ///
    /// * `safety_limit` - Maximum number of items allowed in a single put/delete
    pub fn with_safety_limit(safety_limit: usize) -> Self {
        Self { safety_limit }
    }
}
