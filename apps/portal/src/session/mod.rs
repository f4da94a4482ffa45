//! One signed-in user's portal session.
//!
//! Owns the backend client, the three synced resources, the skill profile and
//! the recommendation feed, all under one root cancellation token. Logging out
//! cancels the root: polling stops, in-flight responses and résumé reads are
//! discarded, and every later operation fails with `SessionClosed`. Cached data
//! is kept so the next start can render offline-first.

pub mod alerts;
pub mod resume;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api_client::PortalClient;
use crate::cache::{CacheKey, CacheStore, FileStore, MemoryStore, ResourceCache};
use crate::config::Config;
use crate::errors::{AppError, ErrorKind};
use crate::models::{
    Application, ApplicationStatus, ApplyRequest, Job, Notification, UserIdentity, UserProfile,
    UserSkillProfile,
};
use crate::recommend::{KeywordMatchScorer, RecommendationEngine, RecommendationFeed};
use crate::sync::{ByIdAndStatus, FullEquality, SyncStatus, SyncedResource};

pub use alerts::{Alert, AlertCenter, AlertVariant};

/// A recommended job with the score it was ranked by.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: Job,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceStatuses {
    pub jobs: SyncStatus,
    pub applications: SyncStatus,
    pub notifications: SyncStatus,
}

/// When each resource last settled a fetch, successful or unchanged.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LastSynced {
    pub jobs: Option<DateTime<Utc>>,
    pub applications: Option<DateTime<Utc>>,
    pub notifications: Option<DateTime<Utc>>,
}

pub struct PortalSession {
    identity: UserIdentity,
    client: PortalClient,
    root: CancellationToken,
    jobs: SyncedResource<Job>,
    applications: SyncedResource<Application>,
    notifications: SyncedResource<Notification>,
    skills: watch::Sender<UserSkillProfile>,
    skills_cache: ResourceCache<UserSkillProfile>,
    profile_cache: ResourceCache<UserProfile>,
    engine: RecommendationEngine,
    feed: RecommendationFeed,
    alerts: Arc<AlertCenter>,
    /// Serializes skill mutations so server answers apply in request order.
    skill_lock: Mutex<()>,
}

impl PortalSession {
    /// Starts a session backed by the file cache in `config.cache_dir`.
    /// Without a usable cache directory the session keeps its cache in memory.
    pub fn start(config: &Config) -> Result<Self, AppError> {
        let store: Arc<dyn CacheStore> = match FileStore::open(&config.cache_dir) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Cache directory unusable, caching in memory only: {e:#}");
                Arc::new(MemoryStore::new())
            }
        };
        Self::start_with_store(config, store)
    }

    pub fn start_with_store(config: &Config, store: Arc<dyn CacheStore>) -> Result<Self, AppError> {
        let identity = UserIdentity {
            email: config.user_email.clone(),
            name: config.user_name.clone(),
        };
        let client = PortalClient::new(&config.client_config())?;
        if !client.has_token() {
            warn!("No bearer token configured: applying and recommendations are disabled");
        }

        let root = CancellationToken::new();
        let alerts = Arc::new(AlertCenter::new(Duration::from_millis(config.alert_ttl_ms)));
        let user = identity.key().to_string();

        let jobs = {
            let client = client.clone();
            SyncedResource::<Job>::builder("jobs", move || {
                let client = client.clone();
                async move { client.fetch_jobs().await }
            })
            .reconcile(FullEquality)
            .interval(Config::poll_interval(config.jobs_poll_ms))
            .cache(ResourceCache::new(store.clone(), CacheKey::new(&user, "jobs")))
            .on_failure(alert_on_failure(
                alerts.clone(),
                "Failed to load job listings. Please try again.",
            ))
            .parent(&root)
            .start()
        };

        let applications = {
            let client = client.clone();
            SyncedResource::<Application>::builder("applications", move || {
                let client = client.clone();
                async move { client.fetch_applications().await }
            })
            .reconcile(ByIdAndStatus)
            .interval(Config::poll_interval(config.applications_poll_ms))
            .cache(ResourceCache::new(
                store.clone(),
                CacheKey::new(&user, "applications"),
            ))
            .on_failure(alert_on_failure(
                alerts.clone(),
                "Failed to load applications.",
            ))
            .parent(&root)
            .start()
        };

        // Ephemeral: never cached.
        let notifications = {
            let client = client.clone();
            let email = identity.email.clone();
            SyncedResource::<Notification>::builder("notifications", move || {
                let client = client.clone();
                let email = email.clone();
                async move {
                    match email {
                        Some(email) => client.fetch_notifications(&email).await,
                        None => Ok(Vec::new()),
                    }
                }
            })
            .reconcile(FullEquality)
            .interval(Config::poll_interval(config.notifications_poll_ms))
            .on_failure(alert_on_failure(
                alerts.clone(),
                "Failed to load notifications.",
            ))
            .parent(&root)
            .start()
        };

        let skills_cache = ResourceCache::new(store.clone(), CacheKey::new(&user, "skills"));
        let (skills, _) = watch::channel(skills_cache.read());

        let profile_cache = ResourceCache::new(store, CacheKey::new(&user, "profile"));
        if matches!(profile_cache.try_read(), Ok(None)) {
            profile_cache.write(&UserProfile::from_identity(&identity));
        }

        let engine = RecommendationEngine::new(Arc::new(
            KeywordMatchScorer::with_min_fallback_token_len(config.fallback_min_token_len),
        ));
        let feed = RecommendationFeed::start(
            engine.clone(),
            jobs.subscribe(),
            applications.subscribe(),
            skills.subscribe(),
            &root,
        );

        info!(user = %user, has_token = client.has_token(), "Session started");

        Ok(Self {
            identity,
            client,
            root,
            jobs,
            applications,
            notifications,
            skills,
            skills_cache,
            profile_cache,
            engine,
            feed,
            alerts,
            skill_lock: Mutex::new(()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.client.has_token()
    }

    pub fn is_active(&self) -> bool {
        !self.root.is_cancelled()
    }

    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AppError::SessionClosed)
        }
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.current()
    }

    pub fn applications(&self) -> Vec<Application> {
        self.applications.current()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.current()
    }

    pub fn skills(&self) -> UserSkillProfile {
        self.skills.borrow().clone()
    }

    pub fn profile(&self) -> UserProfile {
        self.profile_cache
            .read_or(UserProfile::from_identity(&self.identity))
    }

    pub fn statuses(&self) -> ResourceStatuses {
        ResourceStatuses {
            jobs: self.jobs.status(),
            applications: self.applications.status(),
            notifications: self.notifications.status(),
        }
    }

    pub fn last_synced(&self) -> LastSynced {
        LastSynced {
            jobs: self.jobs.last_synced(),
            applications: self.applications.last_synced(),
            notifications: self.notifications.last_synced(),
        }
    }

    /// Whether recommendations are shown at all. Requires a token.
    pub fn recommendations_enabled(&self) -> bool {
        self.has_token()
    }

    /// Current output of the recommendation feed.
    pub fn recommendations(&self) -> Vec<Job> {
        if !self.recommendations_enabled() {
            return Vec::new();
        }
        self.feed.current()
    }

    /// Recommendations with their scores, computed from the current snapshots.
    pub fn ranked(&self) -> Vec<RankedJob> {
        if !self.recommendations_enabled() {
            return Vec::new();
        }
        let jobs = self.jobs.current();
        let applications = self.applications.current();
        let skills = self.skills();
        self.engine
            .rank(&jobs, &applications, &skills)
            .into_iter()
            .map(|r| RankedJob {
                job: r.job.clone(),
                score: r.score,
            })
            .collect()
    }

    /// Re-triggers all three resources out of schedule.
    pub fn refresh_all(&self) -> Result<(), AppError> {
        self.ensure_active()?;
        self.jobs.refresh();
        self.applications.refresh();
        self.notifications.refresh();
        Ok(())
    }

    /// Submits an application for `job_id`, optionally attaching a résumé file.
    ///
    /// On success the new application is appended to the held list as
    /// `Pending` and written through to the cache. On failure held state is
    /// untouched.
    pub async fn apply(
        &self,
        job_id: &str,
        cover_letter: &str,
        resume_path: Option<&Path>,
    ) -> Result<Application, AppError> {
        self.ensure_active()?;

        if self.applications.current().iter().any(|a| a.job_id == job_id) {
            self.alerts.warning("You have already applied for this job.");
            return Err(AppError::Validation(format!(
                "Already applied for job '{job_id}'"
            )));
        }
        if !self.has_token() {
            self.alerts.warning("Please log in to apply for a job.");
            return Err(AppError::Unauthorized);
        }
        let Some(job) = self.jobs.current().into_iter().find(|j| j.id == job_id) else {
            self.alerts.warning("No job selected.");
            return Err(AppError::NotFound(format!("Job '{job_id}'")));
        };

        let resume_url = match resume_path {
            Some(path) => match resume::encode_data_url(path, &self.root).await {
                Ok(url) => Some(url),
                Err(e) => {
                    if !matches!(e, AppError::SessionClosed) {
                        self.alerts.danger("Could not read the résumé file.");
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        let request = ApplyRequest {
            job_id: job.id.clone(),
            cover_letter: cover_letter.to_string(),
            resume_url,
        };
        let created_id = match self.guarded(self.client.apply(&request)).await {
            Ok(id) => id,
            Err(e) => {
                if !matches!(e, AppError::SessionClosed) {
                    warn!(job_id = %job.id, "Application submit failed: {e}");
                    self.alerts
                        .danger("Failed to submit application. Please try again.");
                }
                return Err(e);
            }
        };

        let application = Application {
            id: created_id.unwrap_or_else(|| format!("local-{}", Uuid::new_v4())),
            job_id: job.id.clone(),
            title: job.title.clone(),
            department: job.department.clone(),
            applied_on: Some(Utc::now().date_naive()),
            status: ApplicationStatus::Pending,
            resume_url: request.resume_url.unwrap_or_default(),
        };
        self.applications
            .update(|apps| apps.push(application.clone()))?;
        self.alerts.success(format!(
            "Application submitted successfully for: {}",
            job.title
        ));
        info!(job_id = %job.id, application_id = %application.id, "Application submitted");
        Ok(application)
    }

    /// Adds one skill. With a token the server's answer becomes the profile;
    /// without one the skill is appended locally.
    pub async fn add_skill(&self, raw: &str) -> Result<UserSkillProfile, AppError> {
        self.ensure_active()?;
        let skill = raw.trim();
        if skill.is_empty() {
            self.alerts.warning("Please enter a skill.");
            return Err(AppError::Validation("Skill must not be empty".to_string()));
        }

        let _guard = self.skill_lock.lock().await;
        let next = if self.has_token() {
            match self.guarded(self.client.add_skill(skill)).await {
                Ok(entries) => UserSkillProfile::new(entries),
                Err(e) => {
                    self.alert_mutation_failure(&e, "Failed to add skill. Please try again.");
                    return Err(e);
                }
            }
        } else {
            let mut profile = self.skills();
            profile.add(skill);
            profile
        };

        self.ensure_active()?;
        self.publish_skills(next.clone());
        Ok(next)
    }

    /// Removes a skill. Locally, every entry with the same normalized tokens goes.
    pub async fn remove_skill(&self, skill: &str) -> Result<UserSkillProfile, AppError> {
        self.ensure_active()?;
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(AppError::Validation("Skill must not be empty".to_string()));
        }

        let _guard = self.skill_lock.lock().await;
        let next = if self.has_token() {
            match self.guarded(self.client.remove_skill(skill)).await {
                Ok(entries) => UserSkillProfile::new(entries),
                Err(e) => {
                    self.alert_mutation_failure(&e, "Failed to remove skill. Please try again.");
                    return Err(e);
                }
            }
        } else {
            let mut profile = self.skills();
            if profile.remove(skill) == 0 {
                return Err(AppError::NotFound(format!("Skill '{skill}'")));
            }
            profile
        };

        self.ensure_active()?;
        self.publish_skills(next.clone());
        Ok(next)
    }

    /// Clears every notification for this user. A guest has none to clear.
    pub async fn clear_notifications(&self) -> Result<(), AppError> {
        self.ensure_active()?;
        let Some(email) = self.identity.email.as_deref() else {
            debug!("No email on the identity, nothing to clear");
            return Ok(());
        };

        if let Err(e) = self.guarded(self.client.clear_notifications(email)).await {
            self.alert_mutation_failure(&e, "Failed to clear notifications.");
            return Err(e);
        }
        self.notifications.update(|n| n.clear())?;
        self.alerts.info("All notifications cleared.");
        Ok(())
    }

    /// Stops every resource, the feed and any pending résumé read. Idempotent.
    pub fn logout(&self) {
        if self.root.is_cancelled() {
            return;
        }
        self.root.cancel();
        self.jobs.stop();
        self.applications.stop();
        self.notifications.stop();
        self.feed.stop();
        info!(user = %self.identity.key(), "Session closed");
    }

    /// Resolves once `logout` has been called.
    pub async fn closed(&self) {
        self.root.cancelled().await;
    }

    /// Waits for every background task to exit.
    pub async fn stopped(&self) {
        self.jobs.stopped().await;
        self.applications.stopped().await;
        self.notifications.stopped().await;
    }

    /// Runs `fut` unless the session closes first. A result landing after
    /// logout is discarded.
    async fn guarded<T>(
        &self,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::select! {
            biased;
            _ = self.root.cancelled() => {
                debug!("Dropping in-flight request after logout");
                Err(AppError::SessionClosed)
            }
            result = fut => {
                if self.root.is_cancelled() {
                    debug!("Discarding response received after logout");
                    return Err(AppError::SessionClosed);
                }
                result
            }
        }
    }

    fn publish_skills(&self, profile: UserSkillProfile) {
        self.skills_cache.write(&profile);
        self.skills.send_replace(profile);
    }

    fn alert_mutation_failure(&self, error: &AppError, message: &str) {
        if matches!(error, AppError::SessionClosed) {
            return;
        }
        warn!("{message} ({error})");
        self.alerts.danger(message);
    }
}

/// Fetch-failure hook. A missing token is expected and not worth an alert.
fn alert_on_failure(
    alerts: Arc<AlertCenter>,
    message: &'static str,
) -> impl Fn(&AppError) + Send + Sync + 'static {
    move |error: &AppError| {
        if error.kind() != ErrorKind::Access {
            alerts.danger(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMAIL: &str = "u@x.com";

    fn test_config(server: &MockServer, token: Option<&str>) -> Config {
        Config {
            api_url: server.uri(),
            user_email: Some(EMAIL.to_string()),
            token: token.map(str::to_string),
            jobs_poll_ms: 0,
            applications_poll_ms: 0,
            notifications_poll_ms: 0,
            ..Config::default()
        }
    }

    async fn mount_backend(server: &MockServer, applications: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "1", "title": "ML Engineer", "department": "CSE",
                 "requiredSkills": ["Python", "TensorFlow"]},
                {"_id": "2", "title": "Civil Inspector", "department": "Civil",
                 "requiredSkills": ["AutoCAD"]}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/applications/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(applications))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/notifications/{EMAIL}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "Accepted", "message": "Congrats", "date": "2026-01-01"}
            ])))
            .mount(server)
            .await;
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    fn memory() -> Arc<dyn CacheStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_cached_state_renders_before_first_fetch() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let store = memory();
        store
            .set(
                &format!("{EMAIL}_jobs"),
                &json!([{"id": "old", "title": "Cached", "department": "D",
                         "deadline": "N/A", "owner": "o"}])
                .to_string(),
            )
            .unwrap();

        let session = PortalSession::start_with_store(&test_config(&server, None), store).unwrap();
        assert_eq!(session.jobs()[0].id, "old");

        wait_until(|| session.jobs().len() == 2).await;
        assert_eq!(session.jobs()[0].title, "ML Engineer");
        session.logout();
    }

    #[tokio::test]
    async fn test_recommendations_follow_skill_changes() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/users/skills"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"skills": ["python"]})))
            .expect(1)
            .mount(&server)
            .await;

        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), memory()).unwrap();
        wait_until(|| session.jobs().len() == 2).await;
        assert!(session.recommendations().is_empty());

        let profile = session.add_skill("  Python ").await.unwrap();
        assert_eq!(profile.len(), 1);
        wait_until(|| session.recommendations().len() == 1).await;
        assert_eq!(session.recommendations()[0].id, "1");
        let ranked = session.ranked();
        assert_eq!(ranked[0].score, 10);
        session.logout();
    }

    #[tokio::test]
    async fn test_local_skills_without_token_are_cached() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let store = memory();
        let session =
            PortalSession::start_with_store(&test_config(&server, None), store.clone()).unwrap();

        session.add_skill("Rust, Go").await.unwrap();
        assert_eq!(
            store.get(&format!("{EMAIL}_skills")).unwrap().as_deref(),
            Some(r#"["Rust, Go"]"#)
        );
        assert!(!session.recommendations_enabled());
        assert!(session.recommendations().is_empty());

        assert!(matches!(
            session.remove_skill("python").await,
            Err(AppError::NotFound(_))
        ));
        session.logout();
    }

    #[tokio::test]
    async fn test_empty_skill_is_rejected_with_alert() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let session = PortalSession::start_with_store(&test_config(&server, None), memory()).unwrap();
        assert!(matches!(
            session.add_skill("   ").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(session.alerts().active()[0].variant, AlertVariant::Warning);
        session.logout();
    }

    #[tokio::test]
    async fn test_apply_appends_pending_application() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"application": {"_id": "a9"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let store = memory();
        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), store.clone())
                .unwrap();
        wait_until(|| session.jobs().len() == 2).await;

        let app = session.apply("1", "Hello", None).await.unwrap();
        assert_eq!(app.id, "a9");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(session.applications().len(), 1);
        assert!(store
            .get(&format!("{EMAIL}_applications"))
            .unwrap()
            .is_some_and(|raw| raw.contains("a9")));
        assert_eq!(session.alerts().active()[0].variant, AlertVariant::Success);

        let again = session.apply("1", "Hello", None).await;
        assert!(matches!(again, Err(AppError::Validation(_))));
        session.logout();
    }

    #[tokio::test]
    async fn test_apply_with_empty_success_body_keeps_application() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), memory()).unwrap();
        wait_until(|| session.jobs().len() == 2).await;

        let app = session.apply("1", "Hello", None).await.unwrap();
        assert!(app.id.starts_with("local-"));
        assert_eq!(session.applications(), vec![app]);
        assert_eq!(session.alerts().active()[0].variant, AlertVariant::Success);
        assert!(matches!(
            session.apply("1", "Hello", None).await,
            Err(AppError::Validation(_))
        ));
        session.logout();
    }

    #[tokio::test]
    async fn test_apply_without_token_is_unauthorized() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let session = PortalSession::start_with_store(&test_config(&server, None), memory()).unwrap();
        wait_until(|| session.jobs().len() == 2).await;
        assert!(matches!(
            session.apply("1", "", None).await,
            Err(AppError::Unauthorized)
        ));
        assert!(session.applications().is_empty());
        session.logout();
    }

    #[tokio::test]
    async fn test_failed_apply_leaves_state_untouched() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/applications/apply"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), memory()).unwrap();
        wait_until(|| session.jobs().len() == 2).await;

        assert!(session.apply("1", "Hello", None).await.is_err());
        assert!(session.applications().is_empty());
        assert_eq!(session.alerts().active()[0].variant, AlertVariant::Danger);
        session.logout();
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), memory()).unwrap();
        wait_until(|| session.jobs().len() == 2).await;
        assert!(matches!(
            session.apply("nope", "", None).await,
            Err(AppError::NotFound(_))
        ));
        session.logout();
    }

    #[tokio::test]
    async fn test_clear_notifications_empties_held_list() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/notifications/{EMAIL}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let session = PortalSession::start_with_store(&test_config(&server, None), memory()).unwrap();
        wait_until(|| session.notifications().len() == 1).await;

        session.clear_notifications().await.unwrap();
        assert!(session.notifications().is_empty());
        assert_eq!(session.alerts().active()[0].variant, AlertVariant::Info);
        session.logout();
    }

    #[tokio::test]
    async fn test_fetch_failure_alerts_and_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let store = memory();
        store
            .set(
                &format!("{EMAIL}_jobs"),
                &json!([{"id": "c", "title": "Cached", "department": "D",
                         "deadline": "N/A", "owner": "o"}])
                .to_string(),
            )
            .unwrap();
        let session = PortalSession::start_with_store(&test_config(&server, None), store).unwrap();

        wait_until(|| session.statuses().jobs == SyncStatus::Failed).await;
        assert_eq!(session.jobs()[0].id, "c");
        let messages: Vec<String> = session.alerts().active().into_iter().map(|a| a.message).collect();
        assert!(messages.contains(&"Failed to load job listings. Please try again.".to_string()));
        session.logout();
    }

    #[tokio::test]
    async fn test_missing_token_does_not_alert_on_applications() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let session = PortalSession::start_with_store(&test_config(&server, None), memory()).unwrap();
        wait_until(|| session.statuses().applications == SyncStatus::Failed).await;
        assert!(session.alerts().active().is_empty());
        session.logout();
    }

    #[tokio::test]
    async fn test_logout_closes_session_and_keeps_cache() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([{"_id": "a1", "jobId": "2", "status": "Pending"}])).await;
        let store = memory();
        let session =
            PortalSession::start_with_store(&test_config(&server, Some("t")), store.clone())
                .unwrap();
        wait_until(|| session.applications().len() == 1).await;

        session.logout();
        session.closed().await;
        session.stopped().await;

        let statuses = session.statuses();
        assert_eq!(statuses.jobs, SyncStatus::Stopped);
        assert_eq!(statuses.applications, SyncStatus::Stopped);
        assert_eq!(statuses.notifications, SyncStatus::Stopped);
        assert!(matches!(session.refresh_all(), Err(AppError::SessionClosed)));
        assert!(matches!(
            session.add_skill("rust").await,
            Err(AppError::SessionClosed)
        ));
        assert!(matches!(
            session.apply("1", "", None).await,
            Err(AppError::SessionClosed)
        ));
        assert!(store.get(&format!("{EMAIL}_applications")).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_profile_defaults_from_identity() {
        let server = MockServer::start().await;
        mount_backend(&server, json!([])).await;
        let session = PortalSession::start_with_store(&test_config(&server, None), memory()).unwrap();
        let profile = session.profile();
        assert_eq!(profile.email, EMAIL);
        assert_eq!(profile.department, "Not Set");
        session.logout();
    }
}
