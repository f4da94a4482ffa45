//! Synced resources: one polled backend collection held locally.
//!
//! A resource fetches on start, then on every interval tick or explicit
//! refresh. Fetches are serialized inside one task, so responses are applied in
//! completion order. After every `.await` the task re-checks its cancellation
//! token before mutating state: a response landing after `stop()` is dropped.
//! A response whose request went out before a local `update` is dropped too,
//! and a fresh fetch is scheduled in its place.
//!
//! ```text
//! Idle ──start──▶ Fetching ──ok──▶ Settled ─┐
//!                    ▲      └─err─▶ Failed ──┤ tick / refresh
//!                    └───────────────────────┘
//! any state ──stop()──▶ Stopped (terminal)
//! ```

pub mod reconcile;
pub mod task;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{watch, Notify};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::ResourceCache;
use crate::errors::AppError;

pub use reconcile::{ByIdAndStatus, FullEquality, Reconcile};
pub use task::TaskHandle;

/// Produces the current server-side collection.
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>, AppError>;
}

#[async_trait]
impl<T, F, Fut> Fetch<T> for F
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, AppError>> + Send + 'static,
{
    async fn fetch(&self) -> Result<Vec<T>, AppError> {
        self().await
    }
}

type FailureHook = Arc<dyn Fn(&AppError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Fetching,
    Settled,
    Failed,
    Stopped,
}

/// What a settled fetch did to the held state.
enum Applied {
    Replaced,
    Unchanged,
    /// A local update landed while the request was in flight.
    Superseded,
    Stopped,
}

struct Shared<T> {
    name: String,
    state: watch::Sender<Vec<T>>,
    status: watch::Sender<SyncStatus>,
    /// Bumped under the state lock by every local `update`.
    version: AtomicU64,
    refresh: Notify,
    last_synced: Mutex<Option<DateTime<Utc>>>,
    cache: Option<ResourceCache<Vec<T>>>,
}

impl<T> Shared<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// `Stopped` is terminal: later transitions are ignored.
    fn set_status(&self, next: SyncStatus) {
        self.status.send_if_modified(|current| {
            if *current == SyncStatus::Stopped || *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    async fn fetch_once(
        &self,
        fetcher: &dyn Fetch<T>,
        reconciler: &dyn Reconcile<T>,
        on_failure: Option<&FailureHook>,
        token: &CancellationToken,
    ) {
        if token.is_cancelled() {
            return;
        }
        self.set_status(SyncStatus::Fetching);
        let seen = self.version.load(Ordering::Acquire);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(resource = %self.name, "Dropping in-flight fetch after stop");
                return;
            }
            result = fetcher.fetch() => result,
        };

        if token.is_cancelled() {
            debug!(resource = %self.name, "Discarding stale response");
            return;
        }

        match result {
            Ok(next) => {
                // Stop and local updates are re-checked under the state lock.
                let mut applied = Applied::Unchanged;
                self.state.send_if_modified(|current| {
                    if token.is_cancelled() {
                        applied = Applied::Stopped;
                        return false;
                    }
                    if self.version.load(Ordering::Acquire) != seen {
                        applied = Applied::Superseded;
                        return false;
                    }
                    if !reconciler.has_changed(current, &next) {
                        return false;
                    }
                    *current = next;
                    applied = Applied::Replaced;
                    true
                });

                match applied {
                    Applied::Stopped => {
                        debug!(resource = %self.name, "Discarding response after stop");
                        return;
                    }
                    Applied::Superseded => {
                        debug!(resource = %self.name, "Local update landed mid-fetch, refetching");
                        self.refresh.notify_one();
                        return;
                    }
                    Applied::Replaced => {
                        let held = self.state.borrow().clone();
                        debug!(resource = %self.name, count = held.len(), "Resource changed");
                        if let Some(cache) = &self.cache {
                            cache.write(&held);
                        }
                    }
                    Applied::Unchanged => {
                        debug!(resource = %self.name, "No change since last fetch");
                    }
                }
                if let Ok(mut last) = self.last_synced.lock() {
                    *last = Some(Utc::now());
                }
                self.set_status(SyncStatus::Settled);
            }
            Err(e) => {
                warn!(resource = %self.name, "Fetch failed, keeping last known data: {e}");
                if let Some(hook) = on_failure {
                    hook(&e);
                }
                self.set_status(SyncStatus::Failed);
            }
        }
    }
}

/// A backend collection kept in sync by a background task.
pub struct SyncedResource<T> {
    shared: Arc<Shared<T>>,
    task: TaskHandle,
}

/// Configures and starts a [`SyncedResource`].
pub struct SyncedResourceBuilder<T> {
    name: String,
    fetcher: Arc<dyn Fetch<T>>,
    reconciler: Arc<dyn Reconcile<T>>,
    interval: Option<Duration>,
    cache: Option<ResourceCache<Vec<T>>>,
    on_failure: Option<FailureHook>,
    parent: Option<CancellationToken>,
}

impl<T> SyncedResourceBuilder<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn reconcile(mut self, reconciler: impl Reconcile<T> + 'static) -> Self {
        self.reconciler = Arc::new(reconciler);
        self
    }

    /// `None` fetches once and then only on explicit refresh.
    pub fn interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Write-through cache; also seeds the initial state.
    pub fn cache(mut self, cache: ResourceCache<Vec<T>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn on_failure(mut self, hook: impl Fn(&AppError) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    /// Ties the resource's lifetime to `parent`.
    pub fn parent(mut self, parent: &CancellationToken) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn start(self) -> SyncedResource<T> {
        let initial = match &self.cache {
            Some(cache) => cache.read_or(Vec::new()),
            None => Vec::new(),
        };

        let (state, _) = watch::channel(initial);
        let (status, _) = watch::channel(SyncStatus::Idle);
        let shared = Arc::new(Shared {
            name: self.name,
            state,
            status,
            version: AtomicU64::new(0),
            refresh: Notify::new(),
            last_synced: Mutex::new(None),
            cache: self.cache,
        });

        let task = {
            let shared = shared.clone();
            let fetcher = self.fetcher;
            let reconciler = self.reconciler;
            let on_failure = self.on_failure;
            let interval = self.interval;
            TaskHandle::spawn(self.parent.as_ref(), move |token| async move {
                info!(resource = %shared.name, interval_ms = ?interval.map(|d| d.as_millis()), "Sync started");
                let mut ticker = interval.map(|period| {
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker
                });

                loop {
                    shared
                        .fetch_once(&*fetcher, &*reconciler, on_failure.as_ref(), &token)
                        .await;

                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = shared.refresh.notified() => {}
                        _ = next_tick(&mut ticker) => {}
                    }
                }

                shared.status.send_replace(SyncStatus::Stopped);
                info!(resource = %shared.name, "Sync stopped");
            })
        };

        SyncedResource { shared, task }
    }
}

async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

impl<T> SyncedResource<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Starts with full equality as the reconcile strategy; override on the builder.
    pub fn builder<F>(name: impl Into<String>, fetcher: F) -> SyncedResourceBuilder<T>
    where
        F: Fetch<T> + 'static,
    {
        SyncedResourceBuilder {
            name: name.into(),
            fetcher: Arc::new(fetcher),
            reconciler: Arc::new(FullEquality),
            interval: None,
            cache: None,
            on_failure: None,
            parent: None,
        }
    }

    pub fn current(&self) -> Vec<T> {
        self.shared.state.borrow().clone()
    }

    /// Receiver that wakes only when the held value is actually replaced.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.shared.state.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        *self.shared.status.borrow()
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.shared.last_synced.lock().ok().and_then(|guard| *guard)
    }

    /// Schedules an out-of-band fetch.
    pub fn refresh(&self) {
        self.shared.refresh.notify_one();
    }

    /// Applies a local mutation (for example after a successful POST) and writes it through.
    pub fn update(&self, mutate: impl FnOnce(&mut Vec<T>)) -> Result<(), AppError> {
        if !self.is_active() {
            return Err(AppError::SessionClosed);
        }
        self.shared.state.send_modify(|held| {
            mutate(held);
            self.shared.version.fetch_add(1, Ordering::Release);
        });
        if let Some(cache) = &self.shared.cache {
            cache.write(&self.shared.state.borrow().clone());
        }
        Ok(())
    }

    /// Cancels the repeat schedule and invalidates any in-flight fetch. Terminal.
    pub fn stop(&self) {
        self.task.stop();
        self.shared.status.send_replace(SyncStatus::Stopped);
    }

    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }

    /// Waits until the background task has exited.
    pub async fn stopped(&self) {
        self.task.join().await;
    }
}
