//! HTTP API for the SQL chat front-end
//!
//! Each user action is one POST that runs a single controller pass; the
//! display listens on the session's event stream for the resulting updates.

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::llm::ClientFactory;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager<Arc<dyn ClientFactory>>>,
    /// Model name reported by `/version`
    pub model: String,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager<Arc<dyn ClientFactory>>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            model: model.into(),
        }
    }
}
