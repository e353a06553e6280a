//! Search Gateway Main Entry Point
//!
//! Serves the authenticated search gateway over HTTP, backed by OpenSearch or
//! an in-memory index.

use dotenv::dotenv;
use search_gateway::{create_app, run_server, Dependencies, GatewayError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), GatewayError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_gateway=info,search_gateway_repository=info,tower_http=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| GatewayError::TracingError(e.to_string()))?;

        info!(
            service_name = "search-gateway",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| GatewayError::TracingError(e.to_string()))?;

        info!(
            service_name = "search-gateway",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting Search Gateway");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let addr = deps.server_config.socket_addr();
    let app = create_app(deps.state, deps.server_config.max_body_bytes);

    match run_server(app, addr).await {
        Ok(()) => {
            info!("Search gateway shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search gateway failed");
            Err(e)
        }
    }
}
