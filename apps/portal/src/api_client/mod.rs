//! Portal client: the single point of entry for all backend REST calls.
//!
//! Built once per session from an explicit `ClientConfig`. The bearer token is
//! baked into the client's default headers and never changes afterwards.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub mod wire;

use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::models::{Application, ApplyRequest, Job, Notification};
use wire::{decode_list, ApiApplication, ApiApplyResponse, ApiJob, ApiSkills};

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: Url,
    has_token: bool,
}

impl PortalClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| AppError::Validation("Token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::Validation(format!("Invalid API base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            has_token: config.token.is_some(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.has_token
    }

    /// `GET /api/jobs`
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>, AppError> {
        let body: Value = self.send_json(self.request(Method::GET, &["api", "jobs"])).await?;
        Ok(decode_list::<ApiJob, Job>(body, "jobs"))
    }

    /// `GET /api/applications/user`
    pub async fn fetch_applications(&self) -> Result<Vec<Application>, AppError> {
        self.require_token()?;
        let body: Value = self
            .send_json(self.request(Method::GET, &["api", "applications", "user"]))
            .await?;
        Ok(decode_list::<ApiApplication, Application>(body, "applications"))
    }

    /// `POST /api/applications/apply`. Returns the created application's id when the server sends one.
    ///
    /// Any 2xx counts as created: an empty or unexpected body yields `Ok(None)`.
    pub async fn apply(&self, req: &ApplyRequest) -> Result<Option<String>, AppError> {
        self.require_token()?;
        let response = self
            .send(
                self.request(Method::POST, &["api", "applications", "apply"])
                    .json(req),
            )
            .await?;
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Application accepted but its response body was unreadable: {e}");
                return Ok(None);
            }
        };
        match serde_json::from_slice::<ApiApplyResponse>(&bytes) {
            Ok(created) => Ok(created.created_id()),
            Err(e) => {
                debug!("Apply response carried no application id: {e}");
                Ok(None)
            }
        }
    }

    /// `GET /api/notifications/{email}`
    pub async fn fetch_notifications(&self, email: &str) -> Result<Vec<Notification>, AppError> {
        let body: Value = self
            .send_json(self.request(Method::GET, &["api", "notifications", email]))
            .await?;
        Ok(decode_list::<Notification, Notification>(body, "notifications"))
    }

    /// `DELETE /api/notifications/{email}`
    pub async fn clear_notifications(&self, email: &str) -> Result<(), AppError> {
        self.send(self.request(Method::DELETE, &["api", "notifications", email]))
            .await?;
        Ok(())
    }

    /// `POST /api/users/skills`. Returns the authoritative skill list.
    pub async fn add_skill(&self, skill: &str) -> Result<Vec<Value>, AppError> {
        self.require_token()?;
        let skills: ApiSkills = self
            .send_json(
                self.request(Method::POST, &["api", "users", "skills"])
                    .json(&json!({ "skill": skill })),
            )
            .await?;
        Ok(skills.into_entries())
    }

    /// `DELETE /api/users/skills/{skill}`. Returns the authoritative skill list.
    pub async fn remove_skill(&self, skill: &str) -> Result<Vec<Value>, AppError> {
        self.require_token()?;
        let skills: ApiSkills = self
            .send_json(self.request(Method::DELETE, &["api", "users", "skills", skill]))
            .await?;
        Ok(skills.into_entries())
    }

    fn require_token(&self) -> Result<(), AppError> {
        if self.has_token {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, %url, "Backend request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Backend rejected the bearer token");
        }
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> PortalClient {
        PortalClient::new(&ClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_jobs_maps_wire_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "1", "title": "ML Engineer", "department": "CSE",
                 "deadline": "2026-05-01T00:00:00Z", "requiredSkills": ["Python", "TensorFlow"]}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let jobs = client_for(&server, None).fetch_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "1");
        assert_eq!(jobs[0].deadline, "2026-05-01");
        assert_eq!(jobs[0].required_skills, vec!["Python", "TensorFlow"]);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/applications/user"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "a1", "jobId": "1", "status": "Pending"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let apps = client_for(&server, Some("secret"))
            .fetch_applications()
            .await
            .unwrap();
        assert_eq!(apps[0].job_id, "1");
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/applications/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch_applications().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_non_success_becomes_api_error_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Already applied"})),
            )
            .mount(&server)
            .await;

        let req = ApplyRequest {
            job_id: "1".to_string(),
            cover_letter: String::new(),
            resume_url: None,
        };
        let err = client_for(&server, Some("t")).apply(&req).await.unwrap_err();
        match err {
            AppError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Already applied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_apply_sends_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .and(body_json(json!({"jobId": "1", "coverLetter": "Hello", "resumeUrl": null})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"application": {"_id": "new"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let req = ApplyRequest {
            job_id: "1".to_string(),
            cover_letter: "Hello".to_string(),
            resume_url: None,
        };
        let id = client_for(&server, Some("t")).apply(&req).await.unwrap();
        assert_eq!(id.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_apply_success_without_body_has_no_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(ResponseTemplate::new(201))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Applied"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("t"));
        let req = ApplyRequest {
            job_id: "1".to_string(),
            cover_letter: String::new(),
            resume_url: None,
        };
        assert_eq!(client.apply(&req).await.unwrap(), None);
        assert_eq!(client.apply(&req).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_skill_path_segment_is_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/skills/C%2FC++"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"skills": ["Rust"]})))
            .expect(1)
            .mount(&server)
            .await;

        let skills = client_for(&server, Some("t")).remove_skill("C/C++").await.unwrap();
        assert_eq!(skills, vec![json!("Rust")]);
    }

    #[tokio::test]
    async fn test_notifications_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notifications/a@b.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "Accepted", "message": "You got it", "date": "2026-01-01"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/notifications/a@b.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let notes = client.fetch_notifications("a@b.com").await.unwrap();
        assert_eq!(notes[0].kind, "Accepted");
        client.clear_notifications("a@b.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = PortalClient::new(&ClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(50),
            token: None,
        })
        .unwrap();
        let err = client.fetch_jobs().await.unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Network);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = PortalClient::new(&ClientConfig {
            base_url: "not a url".to_string(),
            timeout: Duration::from_secs(1),
            token: None,
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
