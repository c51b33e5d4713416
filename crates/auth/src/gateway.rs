use orgboard_core::{AuthError, Identity, Role, RoleMap};
use tokio::sync::watch;

use crate::demo;
use crate::store::IdentityStore;

/// Wraps the identity provider with role derivation and frictionless
/// demonstration sign-in.
pub struct AuthGateway<S> {
    store: S,
    roles: RoleMap,
}

impl<S: IdentityStore> AuthGateway<S> {
    pub fn new(store: S, roles: RoleMap) -> Self {
        Self { store, roles }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        tracing::info!("signing up {}", email);
        let identity = self.store.create_account(email, password).await?;
        match display_name {
            Some(name) => self.store.set_display_name(&identity.user_id, name).await,
            None => Ok(identity),
        }
    }

    /// Credential sign-in with the demo recovery path: a sign-in rejected as
    /// not-found or invalid-credential that exactly matches a known demo
    /// account provisions that account on the fly. If provisioning loses a
    /// race (the account now exists), the original sign-in is retried once.
    /// Everything else fails exactly as the provider reported.
    pub async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        tracing::info!("authenticating {}", email);
        match self.store.sign_in(email, password).await {
            Ok(identity) => Ok(identity),
            Err(err @ (AuthError::NotFound | AuthError::InvalidCredential)) => {
                let Some(account) = demo::find(email, password) else {
                    tracing::error!("sign-in failed for {}: {}", email, err);
                    return Err(err);
                };
                tracing::info!("provisioning demo account {}", account.email);
                match self.sign_up(email, password, Some(account.display_name)).await {
                    Ok(identity) => Ok(identity),
                    // Another caller provisioned it first; the credentials
                    // are valid now, so retry the original sign-in once.
                    Err(AuthError::AlreadyInUse) => self.store.sign_in(email, password).await,
                    Err(create_err) => Err(create_err),
                }
            }
            Err(err) => {
                tracing::error!("sign-in failed for {}: {}", email, err);
                Err(err)
            }
        }
    }

    pub async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        self.store.sign_in_federated().await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.store.sign_out().await
    }

    /// Synchronous snapshot of the current session.
    pub fn current_identity(&self) -> Option<Identity> {
        self.store.current_session()
    }

    pub fn watch_session(&self) -> watch::Receiver<Option<Identity>> {
        self.store.watch_session()
    }

    pub fn role_of(&self, identity: Option<&Identity>) -> Role {
        self.roles.role_for(identity)
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }
}
