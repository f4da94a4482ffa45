pub mod handlers;
pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/dashboard", get(handlers::handle_dashboard))
        .route("/api/v1/jobs", get(handlers::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(handlers::handle_get_job))
        .route(
            "/api/v1/recommendations",
            get(handlers::handle_recommendations),
        )
        .route(
            "/api/v1/applications",
            get(handlers::handle_list_applications).post(handlers::handle_apply),
        )
        .route("/api/v1/refresh", post(handlers::handle_refresh))
        .route(
            "/api/v1/notifications",
            get(handlers::handle_list_notifications).delete(handlers::handle_clear_notifications),
        )
        .route(
            "/api/v1/skills",
            get(handlers::handle_list_skills).post(handlers::handle_add_skill),
        )
        .route("/api/v1/skills/:skill", delete(handlers::handle_remove_skill))
        .route("/api/v1/alerts", get(handlers::handle_alerts))
        .route("/api/v1/alerts/:id", delete(handlers::handle_dismiss_alert))
        .route("/api/v1/logout", post(handlers::handle_logout))
        .with_state(state)
}
