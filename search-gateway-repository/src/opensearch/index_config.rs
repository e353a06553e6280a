//! OpenSearch index configuration and mappings.
//!
//! This module defines how gateway index names map onto OpenSearch indices and
//! the settings every gateway index is created with.

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::TEXT_FIELD_NAME;

/// Characters OpenSearch does not accept in an index name.
const FORBIDDEN_INDEX_CHARS: [char; 10] = ['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#'];

/// Maximum length of an OpenSearch index name, in bytes.
const MAX_INDEX_NAME_BYTES: usize = 255;

/// Configuration for the indices the gateway writes to.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    /// Prefix prepended to every gateway index name (e.g., "gateway-").
    pub prefix: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix prepended to every index name
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Resolve the OpenSearch index name for a gateway index.
    ///
    /// OpenSearch index names are lowercase, so the prefixed name is lowercased.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The OpenSearch index name
    /// * `Err(SearchIndexError::ValidationError)` - If OpenSearch would reject the name
    pub fn resolve(&self, name: &str) -> Result<String, SearchIndexError> {
        let resolved = format!("{}{}", self.prefix, name).to_lowercase();

        if resolved.is_empty() {
            return Err(SearchIndexError::validation("Index name cannot be empty"));
        }
        if resolved == "." || resolved == ".." {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' is reserved",
                resolved
            )));
        }
        if resolved.starts_with(['_', '-', '+']) {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' cannot start with '_', '-' or '+'",
                resolved
            )));
        }
        if resolved.len() > MAX_INDEX_NAME_BYTES {
            return Err(SearchIndexError::validation(format!(
                "Index name is longer than {} bytes",
                MAX_INDEX_NAME_BYTES
            )));
        }
        if resolved
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_INDEX_CHARS.contains(&c))
        {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' contains invalid characters",
                resolved
            )));
        }

        Ok(resolved)
    }
}

/// Get the index settings and mappings for a gateway index.
///
/// Documents carry a single analyzed text field; identifiers live in `_id`.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": "strict",
            "properties": {
                TEXT_FIELD_NAME: {
                    "type": "text",
                    "analyzer": "standard"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings();

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());
        assert_eq!(settings["mappings"]["properties"]["t"]["type"], "text");
        assert_eq!(settings["mappings"]["dynamic"], "strict");
    }

    #[test]
    fn test_resolve_lowercases_and_prefixes() {
        let config = IndexConfig::new("gateway-");
        assert_eq!(config.resolve("Cats").unwrap(), "gateway-cats");

        let config = IndexConfig::default();
        assert_eq!(config.resolve("username").unwrap(), "username");
    }

    #[test]
    fn test_resolve_rejects_invalid_names() {
        let config = IndexConfig::default();
        for name in ["", ".", "..", "_cats", "-cats", "+cats", "ca ts", "ca/ts", "ca*ts", "ca#ts"] {
            let result = config.resolve(name);
            assert!(
                matches!(result, Err(SearchIndexError::ValidationError(_))),
                "expected rejection for {:?}",
                name
            );
        }
        assert!(config.resolve(&"c".repeat(256)).is_err());
    }
}
