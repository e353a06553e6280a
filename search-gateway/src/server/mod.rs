// Server module - HTTP server setup and routing
pub mod auth;
pub mod body;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::GatewayError;

pub use self::error::ApiError;
pub use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::search)
                .post(handlers::put)
                .put(handlers::put)
                .delete(handlers::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::map_response(error::render_error_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), GatewayError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::server(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GatewayError::server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_gateway_repository::{InMemoryProvider, SearchIndexService};
    use std::sync::Arc;

    use crate::config::Credentials;

    #[tokio::test]
    async fn test_run_server_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let state = AppState::new(
            SearchIndexService::new(Arc::new(InMemoryProvider::new())),
            Credentials::new("username", "password"),
        );

        let result = run_server(create_app(state, 1024), addr).await;

        assert!(matches!(result, Err(GatewayError::ServerError(_))));
    }
}
