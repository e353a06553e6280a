//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend.

mod client_config;
mod index_config;
mod provider;

pub use client_config::{ClientConfig, DEFAULT_TIMEOUT};
pub use index_config::{get_index_settings, IndexConfig};
pub use provider::OpenSearchProvider;
