use async_trait::async_trait;
use orgboard_core::{AuthError, Identity};
use tokio::sync::watch;

/// Abstract identity provider: credential and federated sign-in, a current
/// session snapshot, and a session-change stream.
///
/// `watch_session` receivers observe the current value immediately and then
/// every subsequent sign-in/sign-out. Dropping the receiver unsubscribes.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in_federated(&self) -> Result<Identity, AuthError>;

    /// Idempotent: signing out with no active session is not an error.
    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_session(&self) -> Option<Identity>;

    fn watch_session(&self) -> watch::Receiver<Option<Identity>>;

    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<Identity, AuthError>;
}
