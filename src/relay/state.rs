use super::translate::TranslationRelay;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Stateless translation relay shared by every connection
    pub relay: Arc<TranslationRelay>,

    /// Origins allowed to open the WebSocket from a browser
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(relay: TranslationRelay, allowed_origins: Vec<String>) -> Self {
        Self {
            relay: Arc::new(relay),
            allowed_origins: Arc::new(allowed_origins),
        }
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}
