//! Identifier and query validation.
//!
//! These checks run before anything reaches the backend: document identifiers
//! must satisfy the backend's character-set and length rules, and public query
//! strings have their relational operators removed so they cannot be read as
//! field-restricted queries.

use serde_json::Value;

/// Maximum length of a document identifier, in characters.
pub const MAX_DOCUMENT_ID_LENGTH: usize = 500;

/// Characters that turn a free-text query into a structured one.
const RELATIONAL_OPERATORS: [char; 4] = [':', '=', '<', '>'];

/// Return true if `doc_id` is a valid document identifier.
///
/// A valid identifier contains only visible, printable ASCII characters
/// (codes 33 through 126 inclusive), is between 1 and 500 characters long,
/// does not begin with `!`, and does not both begin and end with `__`.
///
/// # Example
///
/// ```
/// use search_gateway_repository::is_valid_document_id;
///
/// assert!(is_valid_document_id("Doraemon"));
/// assert!(!is_valid_document_id("!Doraemon"));
/// assert!(!is_valid_document_id("__Doraemon__"));
/// ```
pub fn is_valid_document_id(doc_id: &str) -> bool {
    // Visible ASCII is one byte per character, so byte length is the character count.
    if doc_id.is_empty() || doc_id.len() > MAX_DOCUMENT_ID_LENGTH {
        return false;
    }
    if doc_id.starts_with('!') {
        return false;
    }
    if doc_id.starts_with("__") && doc_id.ends_with("__") {
        return false;
    }
    doc_id.bytes().all(|b| (33..=126).contains(&b))
}

/// Extract a valid document identifier from an untyped JSON value.
///
/// Returns `None` for anything that is not a string, and for strings that fail
/// [`is_valid_document_id`].
pub fn document_id_from_value(value: &Value) -> Option<&str> {
    value.as_str().filter(|id| is_valid_document_id(id))
}

/// Return `query` with every relational operator (`:`, `=`, `<`, `>`) replaced.
///
/// Each operator character is replaced independently, so `":="` becomes two
/// replacements.
pub fn strip_relational_operators(query: &str, replacement: &str) -> String {
    query.replace(RELATIONAL_OPERATORS, replacement)
}

/// [`strip_relational_operators`] with a single space as the replacement.
pub fn strip_relational_operators_default(query: &str) -> String {
    strip_relational_operators(query, " ")
}
