//! In-memory implementation of the search index provider.
//!
//! Keeps every index in process memory and matches queries by case-insensitive
//! tokens. Intended for local development and tests, not as a search engine.

mod provider;

pub use provider::InMemoryProvider;
