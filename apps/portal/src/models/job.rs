use serde::{Deserialize, Serialize};

/// A job posting as the portal client sees it, after boundary renaming.
/// Read-only from the recommendation engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub department: String,
    /// `YYYY-MM-DD`, or `"N/A"` when the posting has no deadline.
    pub deadline: String,
    #[serde(default)]
    pub qualifications: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub owner: String,
    #[serde(default)]
    pub applicant_count: u32,
}

#[cfg(test)]
pub(crate) fn job_fixture(id: &str, title: &str, department: &str, skills: &[&str]) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        department: department.to_string(),
        deadline: "N/A".to_string(),
        qualifications: String::new(),
        description: String::new(),
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        owner: "unknown".to_string(),
        applicant_count: 0,
    }
}
