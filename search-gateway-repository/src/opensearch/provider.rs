//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate. Puts and deletes go through the bulk API,
//! searches through a `simple_query_string` query on the document text field.

use std::fmt;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::client_config::ClientConfig;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{BackendLimits, Document, SearchOptions, TEXT_FIELD_NAME};

/// The backend call an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendCall {
    Put,
    Delete,
    Search,
}

impl fmt::Display for BackendCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("Put"),
            Self::Delete => f.write_str("Delete"),
            Self::Search => f.write_str("Search"),
        }
    }
}

/// OpenSearch provider implementation.
///
/// Provides full-text search capabilities using OpenSearch as the backend.
///
/// # Example
///
/// ```ignore
/// use search_gateway_repository::opensearch::{ClientConfig, IndexConfig};
///
/// let provider = OpenSearchProvider::new(
///     ClientConfig::new("http://localhost:9200"),
///     IndexConfig::default(),
/// )?;
/// provider.ensure_index_exists("username").await?;
/// provider
///     .put_documents("username", &[Document::new("Garfield", "Loves lasagna.")])
///     .await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
    limits: BackendLimits,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the configured URL.
    ///
    /// No request is made; connectivity problems surface on the first call.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(
        client_config: ClientConfig,
        index_config: IndexConfig,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(&client_config.url)
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(client_config.timeout);
        if let Some((username, password)) = client_config.credentials.clone() {
            builder = builder.auth(Credentials::Basic(username, password));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %client_config.url,
            prefix = %index_config.prefix,
            timeout_secs = client_config.timeout.as_secs(),
            authenticated = client_config.credentials.is_some(),
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
            limits: BackendLimits::default(),
        })
    }

    /// Declare different backend limits than the defaults.
    pub fn with_limits(mut self, limits: BackendLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Send bulk action lines for one chunk and check every item's result.
    async fn send_bulk(
        &self,
        call: BackendCall,
        index: &str,
        lines: Vec<Value>,
    ) -> Result<(), SearchIndexError> {
        let index_name = self.index_config.resolve(index)?;
        let body: Vec<JsonBody<Value>> = lines.into_iter().map(JsonBody::new).collect();

        let response = self
            .client
            .bulk(BulkParts::Index(&index_name))
            .refresh(Refresh::WaitFor)
            .body(body)
            .send()
            .await
            .map_err(|e| error_for_transport(call, &e))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "{} request failed", call);
            return Err(error_for_status(call, status.as_u16(), &error_body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        check_bulk_response(call, &body)
    }
}

/// Build the bulk lines that index `documents`, replacing existing ones.
fn bulk_put_lines(documents: &[Document]) -> Vec<Value> {
    documents
        .iter()
        .flat_map(|document| {
            [
                json!({ "index": { "_id": document.id } }),
                json!({ TEXT_FIELD_NAME: document.value }),
            ]
        })
        .collect()
}

/// Build the bulk lines that delete `ids`.
fn bulk_delete_lines(ids: &[String]) -> Vec<Value> {
    ids.iter()
        .map(|id| json!({ "delete": { "_id": id } }))
        .collect()
}

/// Build a free-text search over the document text field.
///
/// All terms must match, mirroring a global full-text search.
fn search_body(query: &str, options: &SearchOptions) -> Value {
    json!({
        "size": options.limit,
        "_source": !options.ids_only,
        "track_total_hits": false,
        "query": {
            "simple_query_string": {
                "query": query,
                "fields": [TEXT_FIELD_NAME],
                "default_operator": "and"
            }
        }
    })
}

/// Extract document identifiers from a search response, in hit order.
fn parse_search_hits(body: &Value) -> Result<Vec<String>, SearchIndexError> {
    let hits = body["hits"]["hits"]
        .as_array()
        .ok_or_else(|| SearchIndexError::parse("Search response missing hits"))?;

    hits.iter()
        .map(|hit| {
            hit["_id"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| SearchIndexError::parse("Search hit missing _id"))
        })
        .collect()
}

/// Check the per-item results of a bulk response.
///
/// Any item throttled with 429 turns the whole chunk into quota exhaustion.
/// Deleting a missing document (404) is not a failure.
fn check_bulk_response(call: BackendCall, body: &Value) -> Result<(), SearchIndexError> {
    if !body["errors"].as_bool().unwrap_or(false) {
        return Ok(());
    }

    let items = body["items"]
        .as_array()
        .ok_or_else(|| SearchIndexError::parse("Bulk response missing items"))?;

    let mut first_failure = None;
    for item in items {
        let Some(result) = item.as_object().and_then(|action| action.values().next()) else {
            continue;
        };
        let status = result["status"]
            .as_u64()
            .and_then(|status| u16::try_from(status).ok())
            .unwrap_or(0);
        if status == 429 {
            return Err(error_for_status(call, status, &result["error"].to_string()));
        }
        let failed = status >= 300 && !(call == BackendCall::Delete && status == 404);
        if failed && first_failure.is_none() {
            first_failure = Some(error_for_status(call, status, &result["error"].to_string()));
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Map an HTTP status from OpenSearch onto the gateway's error signals.
fn error_for_status(call: BackendCall, status: u16, body: &str) -> SearchIndexError {
    let msg = format!("{} failed with status {}: {}", call, status, body);
    match status {
        429 => SearchIndexError::quota_exceeded(msg),
        408 | 504 => SearchIndexError::deadline_exceeded(msg),
        _ => match call {
            BackendCall::Put => SearchIndexError::put(msg),
            BackendCall::Delete => SearchIndexError::delete(msg),
            BackendCall::Search => SearchIndexError::query(msg),
        },
    }
}

/// Map a transport-level failure onto the gateway's error signals.
fn error_for_transport(call: BackendCall, err: &opensearch::Error) -> SearchIndexError {
    if err.is_timeout() {
        return SearchIndexError::deadline_exceeded(err.to_string());
    }
    if let Some(status) = err.status_code() {
        return error_for_status(call, status.as_u16(), &err.to_string());
    }
    match call {
        BackendCall::Put => SearchIndexError::put(err.to_string()),
        BackendCall::Delete => SearchIndexError::delete(err.to_string()),
        BackendCall::Search => SearchIndexError::connection(err.to_string()),
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    fn limits(&self) -> BackendLimits {
        self.limits
    }

    /// Create the index with the gateway mappings unless it already exists.
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        let index_name = self.index_config.resolve(index)?;

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            info!(index = %index_name, "Search index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %index_name, "Created search index");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        // Another instance may have created it between the two calls.
        if error_body.contains("resource_already_exists_exception") {
            return Ok(());
        }

        error!(status = %status, body = %error_body, "Index creation failed");
        Err(SearchIndexError::index_creation(format!(
            "Index creation failed with status {}: {}",
            status, error_body
        )))
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        self.send_bulk(BackendCall::Put, index, bulk_put_lines(documents))
            .await?;
        debug!(index = %index, count = documents.len(), "Documents put");
        Ok(())
    }

    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        self.send_bulk(BackendCall::Delete, index, bulk_delete_lines(ids))
            .await?;
        debug!(index = %index, count = ids.len(), "Documents deleted");
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<String>, SearchIndexError> {
        let index_name = self.index_config.resolve(index)?;

        let response = self
            .client
            .search(SearchParts::Index(&[index_name.as_str()]))
            .body(search_body(query, options))
            .send()
            .await
            .map_err(|e| error_for_transport(BackendCall::Search, &e))?;

        let status = response.status_code();
        // Nothing has been put yet.
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(
                BackendCall::Search,
                status.as_u16(),
                &error_body,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        parse_search_hits(&body)
    }
}
