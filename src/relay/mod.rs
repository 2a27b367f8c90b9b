//! Translation relay service
//!
//! Routes:
//! - GET /health - Health check
//! - GET /ws - WebSocket channel carrying `translate` requests and
//!   `translation` / `error` replies

mod handlers;
mod routes;
mod state;
mod translate;

pub use routes::create_router;
pub use state::AppState;
pub use translate::{TranslationRelay, DEFAULT_TARGET_LANGUAGE};
