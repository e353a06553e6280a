//! # Search Gateway Repository
//!
//! This crate provides the pieces of the search gateway that sit between the
//! HTTP surface and the hosted search backend: identifier and query
//! validation, the `SearchIndexProvider` backend contract, the batching
//! `SearchIndexService`, and two providers (OpenSearch and an in-memory one
//! for local development and tests).

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod service;
pub mod types;
pub mod validation;

pub use config::SearchIndexServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use memory::InMemoryProvider;
pub use opensearch::OpenSearchProvider;
pub use service::SearchIndexService;
pub use types::{BackendLimits, BatchOperationSummary, ChunkOutcome, Document, SearchOptions};
pub use validation::{
    document_id_from_value, is_valid_document_id, strip_relational_operators,
    strip_relational_operators_default,
};
