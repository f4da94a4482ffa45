use std::path::PathBuf;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dashboard::{filter_jobs, DashboardView, ALL_DEPARTMENTS};
use crate::errors::AppError;
use crate::models::{Application, Job, Notification};
use crate::session::{Alert, RankedJob};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub search: String,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyBody {
    pub job_id: String,
    #[serde(default)]
    pub cover_letter: String,
    pub resume_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SkillBody {
    pub skill: String,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub enabled: bool,
    pub jobs: Vec<RankedJob>,
}

#[derive(Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<Value>,
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(DashboardView::snapshot(&state.session)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    state.session.ensure_active()?;
    let jobs = state.session.jobs();
    let department = params.department.as_deref().unwrap_or(ALL_DEPARTMENTS);
    let filtered = filter_jobs(&jobs, &params.search, department)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(filtered))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    state.session.ensure_active()?;
    state
        .session
        .jobs()
        .into_iter()
        .find(|job| job.id == id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job '{id}'")))
}

/// GET /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(RecommendationsResponse {
        enabled: state.session.recommendations_enabled(),
        jobs: state.session.ranked(),
    }))
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(state.session.applications()))
}

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyBody>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = state
        .session
        .apply(&body.job_id, &body.cover_letter, body.resume_path.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// POST /api/v1/refresh
pub async fn handle_refresh(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.refresh_all()?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(state.session.notifications()))
}

/// DELETE /api/v1/notifications
pub async fn handle_clear_notifications(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.session.clear_notifications().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<SkillsResponse>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(SkillsResponse {
        skills: state.session.skills().entries().to_vec(),
    }))
}

/// POST /api/v1/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(body): Json<SkillBody>,
) -> Result<Json<SkillsResponse>, AppError> {
    let profile = state.session.add_skill(&body.skill).await?;
    Ok(Json(SkillsResponse {
        skills: profile.entries().to_vec(),
    }))
}

/// DELETE /api/v1/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
) -> Result<Json<SkillsResponse>, AppError> {
    let profile = state.session.remove_skill(&skill).await?;
    Ok(Json(SkillsResponse {
        skills: profile.entries().to_vec(),
    }))
}

/// GET /api/v1/alerts
pub async fn handle_alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, AppError> {
    state.session.ensure_active()?;
    Ok(Json(state.session.alerts().active()))
}

/// DELETE /api/v1/alerts/:id
pub async fn handle_dismiss_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.session.ensure_active()?;
    if state.session.alerts().dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Alert '{id}'")))
    }
}

/// POST /api/v1/logout
pub async fn handle_logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout();
    StatusCode::NO_CONTENT
}
