use serde::{Deserialize, Serialize};

/// Identity of the signed-in user, supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub email: Option<String>,
    pub name: String,
}

impl UserIdentity {
    /// Cache namespace for this identity.
    pub fn key(&self) -> &str {
        self.email.as_deref().unwrap_or("guest_user")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub department: String,
}

impl UserProfile {
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity
                .email
                .clone()
                .unwrap_or_else(|| "Not Available".to_string()),
            department: "Not Set".to_string(),
        }
    }
}
