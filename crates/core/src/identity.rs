use serde::{Deserialize, Serialize};

/// An authenticated principal, assigned and owned by the identity provider.
/// Read-only everywhere else; some providers never supply an email.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            display_name: None,
        }
    }
}
