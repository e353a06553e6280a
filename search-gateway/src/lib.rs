//! # Search Gateway
//!
//! Authenticated HTTP gateway in front of a hosted full-text search index.
//! A single resource path accepts searches (GET), bulk upserts (POST/PUT) and
//! bulk deletes (DELETE); validation, chunking and backend error handling
//! live in `search-gateway-repository`.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration, credentials and dependency wiring
//! - [`server`]: Router, authentication, handlers and the JSON error envelope
//! - [`errors`]: Startup and server error types

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Credentials, Dependencies, ServerConfig};
pub use errors::GatewayError;
pub use server::{create_app, run_server, AppState};
