use serde::Serialize;

use crate::models::{Application, ApplicationStatus, Job, UserProfile};
use crate::session::{Alert, PortalSession, ResourceStatuses};

/// Department filter value that matches every job.
pub const ALL_DEPARTMENTS: &str = "All";

/// Jobs whose title or department contains `search` (case-insensitive, trimmed)
/// and whose department equals `department`, or any department for `"All"`.
pub fn filter_jobs<'a>(jobs: &'a [Job], search: &str, department: &str) -> Vec<&'a Job> {
    let needle = search.trim().to_lowercase();
    jobs.iter()
        .filter(|job| {
            needle.is_empty()
                || job.title.to_lowercase().contains(&needle)
                || job.department.to_lowercase().contains(&needle)
        })
        .filter(|job| department == ALL_DEPARTMENTS || job.department == department)
        .collect()
}

/// Distinct departments in first-seen order.
pub fn departments(jobs: &[Job]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for job in jobs {
        if !job.department.is_empty() && !seen.contains(&job.department) {
            seen.push(job.department.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub accepted: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Applications submitted with a résumé attached.
    pub with_resume: usize,
}

impl ApplicationStats {
    pub fn from_applications(applications: &[Application]) -> Self {
        applications
            .iter()
            .fold(Self::default(), |mut stats, app| {
                stats.total += 1;
                if app.resume_uploaded() {
                    stats.with_resume += 1;
                }
                match app.status {
                    ApplicationStatus::Accepted => stats.accepted += 1,
                    ApplicationStatus::Pending => stats.pending += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }
}

/// Everything the applicant dashboard renders, in one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub user: UserProfile,
    pub stats: ApplicationStats,
    pub recommendations: Vec<Job>,
    pub recommendations_enabled: bool,
    pub notifications_count: usize,
    pub departments: Vec<String>,
    pub alerts: Vec<Alert>,
    pub sync: ResourceStatuses,
}

impl DashboardView {
    pub fn snapshot(session: &PortalSession) -> Self {
        let applications = session.applications();
        let jobs = session.jobs();
        Self {
            user: session.profile(),
            stats: ApplicationStats::from_applications(&applications),
            recommendations: session.recommendations(),
            recommendations_enabled: session.recommendations_enabled(),
            notifications_count: session.notifications().len(),
            departments: departments(&jobs),
            alerts: session.alerts().active(),
            sync: session.statuses(),
        }
    }
}
