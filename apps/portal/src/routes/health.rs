use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus the sync state of each resource and when it last settled.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": if state.session.is_active() { "ok" } else { "closed" },
        "version": env!("CARGO_PKG_VERSION"),
        "service": "portal",
        "backend": state.config.api_url,
        "sync": state.session.statuses(),
        "last_synced": state.session.last_synced(),
    }))
}
