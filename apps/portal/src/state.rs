use std::sync::Arc;

use crate::config::Config;
use crate::session::PortalSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<PortalSession>,
    pub config: Config,
}
