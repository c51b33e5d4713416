use orgboard_core::{Identity, Role, RoleMap};
use tokio::sync::watch;

/// Role-annotated view of the current authentication state, as consumed by
/// presentation code.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub role: Role,
}

impl Session {
    fn derive(identity: Option<Identity>, roles: &RoleMap) -> Self {
        Self {
            role: roles.role_for(identity.as_ref()),
            identity,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admin counts as team: capability containment, not a separate bit.
    pub fn is_team(&self) -> bool {
        self.role.satisfies(Role::Team)
    }
}

/// Process-wide observer bridging the identity provider's session stream
/// into role-annotated sessions. New subscribers observe the current
/// session immediately, then every subsequent change.
pub struct SessionContext {
    sessions: watch::Receiver<Session>,
}

impl SessionContext {
    pub fn spawn(mut identities: watch::Receiver<Option<Identity>>, roles: RoleMap) -> Self {
        let initial = Session::derive(identities.borrow_and_update().clone(), &roles);
        let (tx, sessions) = watch::channel(initial);

        tokio::spawn(async move {
            while identities.changed().await.is_ok() {
                let session = Session::derive(identities.borrow_and_update().clone(), &roles);
                if tx.send(session).is_err() {
                    break; // every subscriber is gone
                }
            }
        });

        Self { sessions }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sessions.clone()
    }

    pub fn current(&self) -> Session {
        self.sessions.borrow().clone()
    }
}
