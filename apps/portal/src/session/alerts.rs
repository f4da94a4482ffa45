use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertVariant {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub message: String,
    pub variant: AlertVariant,
    pub raised_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Instant,
}

/// Short-lived user-facing messages: fetch failures, apply results, validation errors.
pub struct AlertCenter {
    ttl: Duration,
    alerts: Mutex<Vec<Alert>>,
}

impl AlertCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, message: impl Into<String>, variant: AlertVariant) -> Uuid {
        let alert = Alert {
            id: Uuid::new_v4(),
            message: message.into(),
            variant,
            raised_at: Utc::now(),
            expires_at: Instant::now() + self.ttl,
        };
        let id = alert.id;
        info!(alert_id = %id, variant = ?variant, message = %alert.message, "Alert raised");
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert);
        }
        id
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(message, AlertVariant::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(message, AlertVariant::Success)
    }

    pub fn danger(&self, message: impl Into<String>) -> Uuid {
        self.push(message, AlertVariant::Danger)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.push(message, AlertVariant::Warning)
    }

    /// Unexpired alerts, oldest first. Expired ones are pruned.
    pub fn active(&self) -> Vec<Alert> {
        let now = Instant::now();
        match self.alerts.lock() {
            Ok(mut alerts) => {
                alerts.retain(|a| a.expires_at > now);
                alerts.clone()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Removes one alert ahead of its expiry. False when it is already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        match self.alerts.lock() {
            Ok(mut alerts) => {
                let before = alerts.len();
                alerts.retain(|a| a.id != id);
                alerts.len() != before
            }
            Err(_) => false,
        }
    }
}
