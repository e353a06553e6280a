//! Error types for the search gateway binary.

use thiserror::Error;

/// Errors that can occur during gateway initialization or while serving.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The HTTP server failed to bind or serve.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Logging could not be initialized.
    #[error("Tracing error: {0}")]
    TracingError(String),
}

impl GatewayError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}
