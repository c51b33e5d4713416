use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthorizationError;
use crate::identity::Identity;

/// Coarse privilege tier derived from the identity's email. Never stored.
///
/// Tiers are ordered: `Admin` satisfies every `Team` requirement, `Team`
/// every `User` requirement, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Visitor,
    User,
    Team,
    Admin,
}

impl Role {
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    /// Role gate for caller-facing layers; checked before any store call.
    pub fn authorize(self, required: Role) -> Result<(), AuthorizationError> {
        if self.satisfies(required) {
            Ok(())
        } else {
            Err(AuthorizationError {
                required,
                current: self,
            })
        }
    }

    /// Whether this role may create, edit or delete domain records.
    pub fn can_manage_records(self) -> bool {
        self.satisfies(Role::Team)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Visitor => "visitor",
            Role::User => "user",
            Role::Team => "team",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Injected allow-list configuration mapping emails to roles. Comparison is
/// case-insensitive; lists are lowercased once at construction.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    admin_emails: Vec<String>,
    team_emails: Vec<String>,
}

impl RoleMap {
    pub fn new<I, T>(admin_emails: I, team_emails: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            admin_emails: lowercased(admin_emails),
            team_emails: lowercased(team_emails),
        }
    }

    /// The allow-lists shipped with the demonstration deployment.
    pub fn demo() -> Self {
        Self::new(vec!["admin@u4.com"], vec!["team@u4.com"])
    }

    /// Derive the role for an identity. Pure: no identity is a visitor,
    /// an authenticated identity outside both allow-lists is a plain user.
    pub fn role_for(&self, identity: Option<&Identity>) -> Role {
        let Some(identity) = identity else {
            return Role::Visitor;
        };
        let Some(email) = identity.email.as_deref() else {
            return Role::User;
        };
        let email = email.to_lowercase();
        if self.admin_emails.iter().any(|e| *e == email) {
            Role::Admin
        } else if self.team_emails.iter().any(|e| *e == email) {
            Role::Team
        } else {
            Role::User
        }
    }
}

fn lowercased<I, T>(emails: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    emails
        .into_iter()
        .map(|e| e.into().to_lowercase())
        .collect()
}
