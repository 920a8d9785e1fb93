//! Shared application state for the web server.

use std::sync::Arc;

use crate::service::PublicationService;

/// Shared state injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<PublicationService>,
}

impl AppState {
    pub fn new(service: PublicationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub type SharedState = Arc<AppState>;
