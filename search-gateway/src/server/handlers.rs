// HTTP request handlers
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{debug, info};

use super::auth::IndexName;
use super::body::{documents_from_object, ids_from_array, RequestBody};
use super::error::{ApiError, JSON_CONTENT_TYPE};
use super::state::AppState;

/// Search endpoint - returns the identifiers of documents matching `q`
pub async fn search(
    State(state): State<AppState>,
    Extension(IndexName(index)): Extension<IndexName>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let query = params
        .into_iter()
        .find_map(|(name, value)| (name == "q").then_some(value))
        .unwrap_or_default();

    let ids = if query.is_empty() {
        Vec::new()
    } else {
        state.service.search(&index, &query).await
    };

    debug!(index = %index, results = ids.len(), "Search completed");

    let mut response = Json(ids).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    response
}

/// Put endpoint - stores every well-formed entry of a JSON object body
pub async fn put(
    State(state): State<AppState>,
    Extension(IndexName(index)): Extension<IndexName>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let RequestBody::Object(map) = RequestBody::decode(&headers, &body) else {
        debug!(index = %index, "Put body is not a JSON object, nothing to do");
        return Ok(StatusCode::OK);
    };

    let limits = state.service.limits();
    let documents = documents_from_object(&map, limits.max_field_value_length);
    let summary = state.service.put(&index, &documents).await?;

    info!(
        index = %index,
        submitted = map.len(),
        accepted = summary.total,
        applied = summary.applied_items,
        failed_chunks = summary.failed_chunks,
        aborted = summary.aborted,
        "Put request handled"
    );
    Ok(StatusCode::OK)
}

/// Delete endpoint - removes every well-formed identifier of a JSON array body
pub async fn delete(
    State(state): State<AppState>,
    Extension(IndexName(index)): Extension<IndexName>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let RequestBody::Array(values) = RequestBody::decode(&headers, &body) else {
        debug!(index = %index, "Delete body is not a JSON array, nothing to do");
        return Ok(StatusCode::OK);
    };

    let ids = ids_from_array(&values);
    let summary = state.service.delete(&index, &ids).await?;

    info!(
        index = %index,
        submitted = values.len(),
        accepted = summary.total,
        applied = summary.applied_items,
        failed_chunks = summary.failed_chunks,
        aborted = summary.aborted,
        "Delete request handled"
    );
    Ok(StatusCode::OK)
}
