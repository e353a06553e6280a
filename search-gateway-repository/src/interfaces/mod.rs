//! The contract every search backend implements.
//!
//! The batch gateway only talks to backends through `SearchIndexProvider`, so
//! OpenSearch and the in-memory index are interchangeable.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
