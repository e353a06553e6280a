//! Request body decoding for put and delete.
//!
//! Bodies that are not the JSON shape an operation expects are treated as an
//! empty request rather than an error.

use axum::http::{header, HeaderMap};
use search_gateway_repository::{document_id_from_value, is_valid_document_id, Document};
use serde_json::{Map, Value};

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON object: identifier to text value.
    Object(Map<String, Value>),
    /// A JSON array of identifiers.
    Array(Vec<Value>),
    /// Anything else, including bodies that are not JSON at all.
    Other,
}

impl RequestBody {
    /// Decode `bytes` as JSON when the request declares a JSON content type.
    pub fn decode(headers: &HeaderMap, bytes: &[u8]) -> Self {
        if !is_json_content_type(headers) {
            return Self::Other;
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self::Object(map),
            Ok(Value::Array(values)) => Self::Array(values),
            _ => Self::Other,
        }
    }
}

/// `application/json` or any `application/*+json` type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Build one document per entry with a valid identifier and a non-empty string
/// value, truncating values to `max_field_value_length` characters.
pub fn documents_from_object(map: &Map<String, Value>, max_field_value_length: usize) -> Vec<Document> {
    map.iter()
        .filter(|(id, _)| is_valid_document_id(id))
        .filter_map(|(id, value)| match value {
            Value::String(text) if !text.is_empty() => {
                Some(Document::truncated(id.as_str(), text, max_field_value_length))
            }
            _ => None,
        })
        .collect()
}

/// Keep the entries that are valid identifiers.
pub fn ids_from_array(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(document_id_from_value)
        .map(str::to_string)
        .collect()
}
