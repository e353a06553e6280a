//! Configuration and dependency initialization for the search gateway.
//!
//! Everything is read from the environment once at startup (optionally seeded
//! from a `.env` file) and passed into the router as immutable state.

mod credentials;
mod dependencies;

pub use credentials::{Credentials, PASSWORD_ENV, USERNAME_ENV};
pub use dependencies::{ConnectionMode, Dependencies};

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use search_gateway_repository::config::DEFAULT_SAFETY_LIMIT;
use tracing::warn;

/// Default address the server binds to.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default port the server listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Default maximum request body size accepted by the server.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Which search backend serves the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// A hosted OpenSearch cluster.
    OpenSearch,
    /// A process-local index, for development.
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opensearch" => Ok(Self::OpenSearch),
            "memory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            other => Err(format!("unknown search backend '{}'", other)),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Largest request body accepted before answering 413.
    pub max_body_bytes: usize,
    /// Maximum number of documents per put/delete request.
    pub safety_limit: usize,
    /// Search backend to use.
    pub backend: BackendKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            safety_limit: DEFAULT_SAFETY_LIMIT,
            backend: BackendKind::OpenSearch,
        }
    }
}

impl ServerConfig {
    /// Read server settings from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `SERVER_HOST`: Bind address (default: 0.0.0.0)
    /// - `SERVER_PORT`: Listen port (default: 8080)
    /// - `MAX_BODY_BYTES`: Request body limit (default: 32 MiB)
    /// - `SAFETY_LIMIT`: Documents per put/delete (default: 15000)
    /// - `SEARCH_BACKEND`: "opensearch" or "memory" (default: opensearch)
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("SERVER_HOST", defaults.host),
            port: env_or("SERVER_PORT", defaults.port),
            max_body_bytes: env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
            safety_limit: env_or("SAFETY_LIMIT", defaults.safety_limit),
            backend: env_or("SEARCH_BACKEND", defaults.backend),
        }
    }

    /// The socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(name: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(variable = %name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
