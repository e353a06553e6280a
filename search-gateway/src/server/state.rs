use std::sync::Arc;

use search_gateway_repository::SearchIndexService;

use crate::config::Credentials;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchIndexService>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(service: SearchIndexService, credentials: Credentials) -> Self {
        Self {
            service: Arc::new(service),
            credentials: Arc::new(credentials),
        }
    }
}
