use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Review state of an application. Pending moves once to Accepted or Rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Accepted,
    Rejected,
    // Kept last: serde requires #[serde(other)] on the final variant.
    #[default]
    #[serde(other)]
    Pending,
}

impl ApplicationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Staying in the same state is always allowed.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self == next || !self.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub title: String,
    pub department: String,
    pub applied_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub resume_url: String,
}

impl Application {
    pub fn resume_uploaded(&self) -> bool {
        !self.resume_url.is_empty()
    }
}

/// Body of `POST /api/applications/apply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: String,
    pub cover_letter: String,
    pub resume_url: Option<String>,
}

#[cfg(test)]
pub(crate) fn application_fixture(id: &str, job_id: &str, status: ApplicationStatus) -> Application {
    Application {
        id: id.to_string(),
        job_id: job_id.to_string(),
        title: "N/A".to_string(),
        department: "N/A".to_string(),
        applied_on: None,
        status,
        resume_url: String::new(),
    }
}
