use std::sync::Arc;

use crate::config::Config;
use crate::interview::manager::InterviewManager;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store and both generator collaborators.
    pub manager: Arc<InterviewManager>,
    pub config: Config,
}
