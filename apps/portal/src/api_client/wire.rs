//! Backend wire shapes and their mapping onto the client's models.
//!
//! The backend speaks Mongo-style documents (`_id`, populated references,
//! ISO datetimes). Everything is renamed and defaulted here so nothing past
//! this module sees a wire name.

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Application, ApplicationStatus, Job};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiJob {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    pub deadline: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub owner: Value,
    #[serde(default)]
    pub applicant_count: Option<u32>,
}

impl From<ApiJob> for Job {
    fn from(api: ApiJob) -> Self {
        Job {
            id: api.id,
            title: api.title,
            department: api.department,
            deadline: deadline_date(api.deadline.as_deref()),
            qualifications: api.qualifications.unwrap_or_default(),
            description: api.description.unwrap_or_default(),
            required_skills: api.required_skills.unwrap_or_default(),
            owner: owner_label(&api.owner),
            applicant_count: api.applicant_count.unwrap_or(0),
        }
    }
}

/// `jobId` arrives either populated with the job document or as a bare id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiJobRef {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        department: Option<String>,
    },
    Id(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiApplication {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_id: Option<ApiJobRef>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<ApiApplication> for Application {
    fn from(api: ApiApplication) -> Self {
        let (job_id, title, department) = match api.job_id {
            Some(ApiJobRef::Populated {
                id,
                title,
                department,
            }) => (id, title, department),
            Some(ApiJobRef::Id(id)) => (id, None, None),
            None => (String::new(), None, None),
        };
        Application {
            id: api.id,
            job_id,
            title: title.unwrap_or_else(|| "N/A".to_string()),
            department: department.unwrap_or_else(|| "N/A".to_string()),
            applied_on: api.created_at.as_deref().and_then(parse_date),
            status: api.status.unwrap_or_default(),
            resume_url: api.resume_url.unwrap_or_default(),
        }
    }
}

/// `POST /api/applications/apply` answers `{application: {_id}}` or the bare document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiApplyResponse {
    Wrapped { application: ApiCreated },
    Bare(ApiCreated),
}

#[derive(Debug, Deserialize)]
pub struct ApiCreated {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

impl ApiApplyResponse {
    pub fn created_id(self) -> Option<String> {
        match self {
            ApiApplyResponse::Wrapped { application } => application.id,
            ApiApplyResponse::Bare(created) => created.id,
        }
    }
}

/// Skill endpoints answer a bare array or `{ "skills": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiSkills {
    Wrapped { skills: Vec<Value> },
    Bare(Vec<Value>),
}

impl ApiSkills {
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            ApiSkills::Wrapped { skills } => skills,
            ApiSkills::Bare(skills) => skills,
        }
    }
}

/// Decodes a list response item by item. A non-array body is an empty list and
/// malformed items are skipped.
pub fn decode_list<W, T>(body: Value, resource: &str) -> Vec<T>
where
    W: DeserializeOwned,
    T: From<W>,
{
    let Value::Array(items) = body else {
        warn!(resource = resource, "Expected a JSON array, treating as empty");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<W>(item) {
            Ok(wire) => Some(T::from(wire)),
            Err(e) => {
                warn!(resource = resource, "Skipping malformed item: {e}");
                None
            }
        })
        .collect()
}

fn deadline_date(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.split('T').next().unwrap_or(s).to_string(),
        None => "N/A".to_string(),
    }
}

fn owner_label(owner: &Value) -> String {
    let label = match owner {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("email")
            .or_else(|| map.get("name"))
            .and_then(Value::as_str),
        _ => None,
    };
    label
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
