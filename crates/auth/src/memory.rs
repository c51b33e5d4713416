use std::collections::HashMap;
use std::sync::Mutex;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use orgboard_core::{AuthError, Identity};
use tokio::sync::watch;
use uuid::Uuid;

use crate::store::IdentityStore;

struct Account {
    user_id: String,
    email: String,
    display_name: Option<String>,
    password_hash: String,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
        }
    }
}

/// In-process identity provider backing tests and local development.
/// Credentials are argon2-hashed; creating an account signs it in, matching
/// hosted providers.
pub struct MemoryIdentityStore {
    accounts: Mutex<HashMap<String, Account>>, // keyed by lowercased email
    session: watch::Sender<Option<Identity>>,
    federated: Option<Identity>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
            federated: None,
        }
    }

    /// Configure the canned identity returned by federated sign-in.
    pub fn with_federated_identity(mut self, identity: Identity) -> Self {
        self.federated = Some(identity);
        self
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Provider(e.to_string()))
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::MalformedIdentifier);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakCredential);
        }

        let password_hash = Self::hash_password(password)?;
        let mut accounts = self.accounts.lock().unwrap();
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(AuthError::AlreadyInUse);
        }

        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: None,
            password_hash,
        };
        let identity = account.identity();
        accounts.insert(key, account);
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(&email.to_lowercase())
            .ok_or(AuthError::NotFound)?;
        if !Self::verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredential);
        }
        let identity = account.identity();
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        let identity = self
            .federated
            .clone()
            .ok_or_else(|| AuthError::Provider("no federated provider configured".to_string()))?;
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.send_replace(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }

    fn watch_session(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }

    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<Identity, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|account| account.user_id == user_id)
            .ok_or(AuthError::NotFound)?;
        account.display_name = Some(name.to_string());
        let identity = account.identity();

        // Keep an active session for this user in step with the profile.
        let signed_in = self
            .session
            .borrow()
            .as_ref()
            .is_some_and(|current| current.user_id == user_id);
        if signed_in {
            self.session.send_replace(Some(identity.clone()));
        }
        Ok(identity)
    }
}
