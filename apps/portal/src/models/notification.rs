use serde::{Deserialize, Serialize};

/// A status-change notice pushed by the admin side. Cleared as a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub date: String,
}
