//! Dependency initialization and wiring for the search gateway.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::{env_or, BackendKind, Credentials, ServerConfig};
use crate::server::AppState;
use crate::GatewayError;
use search_gateway_repository::opensearch::{ClientConfig, IndexConfig, DEFAULT_TIMEOUT};
use search_gateway_repository::{
    InMemoryProvider, OpenSearchProvider, SearchIndexError, SearchIndexProvider,
    SearchIndexService, SearchIndexServiceConfig,
};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if the index cannot be reached.
    FailFast,
    /// Retry every `OPENSEARCH_RETRY_INTERVAL_SECS` until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode, case-insensitively.
    ///
    /// Valid values: "fail-fast" or "retry". Anything else is `None`.
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Some(Self::FailFast),
            "retry" => Some(Self::Retry),
            _ => None,
        }
    }

    /// Parse connection mode from `OPENSEARCH_CONNECTION_MODE`.
    ///
    /// Defaults to "retry" if not set or invalid.
    fn from_env() -> Self {
        let raw = env::var("OPENSEARCH_CONNECTION_MODE").unwrap_or_else(|_| "retry".to_string());
        Self::parse(&raw).unwrap_or_else(|| {
            warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
            Self::Retry
        })
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Server settings the router and listener are built from.
    pub server_config: ServerConfig,
    /// Shared handler state.
    pub state: AppState,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BASIC_AUTH_USERNAME` / `BASIC_AUTH_PASSWORD`: Accepted credentials; the
    ///   username names the index
    /// - `SEARCH_BACKEND`: "opensearch" or "memory" (default: opensearch)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: Optional cluster credentials
    /// - `OPENSEARCH_TIMEOUT_SECS`: Per-call deadline in seconds (default: 30)
    /// - `INDEX_PREFIX`: Prefix for OpenSearch index names (default: none)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    ///
    /// See [`ServerConfig::from_env`] for the server settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(GatewayError)` - If the index name is invalid, or the backend is
    ///   unreachable in fail-fast mode
    pub async fn new() -> Result<Self, GatewayError> {
        let server_config = ServerConfig::from_env();
        let credentials = Credentials::from_env();

        info!(
            backend = ?server_config.backend,
            address = %server_config.socket_addr(),
            safety_limit = server_config.safety_limit,
            max_body_bytes = server_config.max_body_bytes,
            "Initializing dependencies"
        );

        if !credentials.is_configured() {
            warn!("BASIC_AUTH_USERNAME or BASIC_AUTH_PASSWORD is not set; every request will be rejected");
        }

        let provider: Arc<dyn SearchIndexProvider> = match server_config.backend {
            BackendKind::Memory => {
                info!("Using in-memory search backend");
                Arc::new(InMemoryProvider::new())
            }
            BackendKind::OpenSearch => Arc::new(Self::opensearch_provider()?),
        };

        let service = SearchIndexService::with_config(
            provider,
            SearchIndexServiceConfig::with_safety_limit(server_config.safety_limit),
        );

        // Create the index up front so the first write does not pay for it
        if let Some(index) = credentials.index_name() {
            let connection_mode = ConnectionMode::from_env();
            let retry_interval = Duration::from_secs(env_or(
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            ));
            Self::ensure_index(&service, index, connection_mode, retry_interval).await?;
            info!(index = %index, "Search index ready");
        }

        Ok(Self {
            server_config,
            state: AppState::new(service, credentials),
        })
    }

    /// Build the OpenSearch provider from the environment.
    fn opensearch_provider() -> Result<OpenSearchProvider, GatewayError> {
        let url = env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let timeout = Duration::from_secs(env_or(
            "OPENSEARCH_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        ));

        let mut client_config = ClientConfig::new(url).with_timeout(timeout);
        if let (Ok(username), Ok(password)) = (
            env::var("OPENSEARCH_USERNAME"),
            env::var("OPENSEARCH_PASSWORD"),
        ) {
            client_config = client_config.with_basic_auth(username, password);
        }

        let index_config = IndexConfig::new(env::var("INDEX_PREFIX").unwrap_or_default());

        OpenSearchProvider::new(client_config, index_config).map_err(|e| {
            GatewayError::config(format!("Failed to create OpenSearch provider: {}", e))
        })
    }

    /// Ensure the index exists, retrying according to the connection mode.
    ///
    /// An index name the backend rejects fails immediately in either mode.
    async fn ensure_index(
        service: &SearchIndexService,
        index: &str,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<(), GatewayError> {
        loop {
            match service.ensure_index_exists(index).await {
                Ok(()) => return Ok(()),
                // Rejected before any backend call
                Err(e @ SearchIndexError::ValidationError(_)) => {
                    return Err(GatewayError::config(format!("Invalid index name: {}", e)));
                }
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(GatewayError::config(format!(
                            "Failed to ensure index exists: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            index = %index,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to reach search backend, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
