//! OpenSearch client connection settings.

use std::time::Duration;

/// Default deadline for a single OpenSearch call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the OpenSearch client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The OpenSearch server URL (e.g., "http://localhost:9200").
    pub url: String,
    /// Optional basic-auth credentials for the cluster.
    pub credentials: Option<(String, String)>,
    /// Deadline for each call; expiry is reported as `DeadlineExceeded`.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create settings for `url` without authentication and with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Authenticate against the cluster with basic auth.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
