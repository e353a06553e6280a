//! HTTP Basic authentication.
//!
//! Every request must present the configured credential pair. On success the
//! index name is attached to the request as an [`IndexName`] extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;

/// The index an authenticated request operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexName(pub String);

/// Extract the username/password pair from an `Authorization: Basic` header.
///
/// The scheme is matched case-insensitively and the decoded value is split at
/// the first `:`, so passwords may themselves contain colons.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Reject requests that do not carry the configured credentials.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let index = basic_credentials(req.headers()).and_then(|(username, password)| {
        state
            .credentials
            .authenticate(&username, &password)
            .map(str::to_string)
    });

    match index {
        Some(index) => {
            req.extensions_mut().insert(IndexName(index));
            next.run(req).await
        }
        None => {
            debug!(method = %req.method(), "Rejected unauthenticated request");
            ApiError::unauthorized().into_response()
        }
    }
}
