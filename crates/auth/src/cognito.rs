use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use orgboard_core::{AuthError, Identity};
use sha2::Sha256;
use tokio::sync::watch;

use crate::store::IdentityStore;

type HmacSha256 = Hmac<Sha256>;

/// AWS Cognito identity provider adapter. Holds the access token of the
/// current session; one adapter serves one logical session at a time.
pub struct CognitoIdentityStore {
    client: CognitoClient,
    client_id: String,
    client_secret: String,
    user_pool_id: Option<String>,
    session: watch::Sender<Option<Identity>>,
    access_token: Mutex<Option<String>>,
}

/// Compute the SECRET_HASH for Cognito authentication
fn compute_secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let message = format!("{}{}", username, client_id);
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    general_purpose::STANDARD.encode(result.into_bytes())
}

fn map_cognito_error(context: &str, message: String) -> AuthError {
    tracing::error!("Cognito {} error: {}", context, message);
    if message.contains("UserNotFoundException") {
        AuthError::NotFound
    } else if message.contains("NotAuthorizedException") {
        AuthError::InvalidCredential
    } else if message.contains("UsernameExistsException") {
        AuthError::AlreadyInUse
    } else if message.contains("InvalidPasswordException") {
        AuthError::WeakCredential
    } else if message.contains("InvalidParameterException") {
        AuthError::MalformedIdentifier
    } else if message.contains("TooManyRequestsException") {
        AuthError::RateLimited
    } else {
        AuthError::Provider(message)
    }
}

impl CognitoIdentityStore {
    pub fn new(
        client: CognitoClient,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_pool_id: Option<String>,
    ) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_pool_id,
            session,
            access_token: Mutex::new(None),
        }
    }

    /// Build from `COGNITO_CLIENT_ID`, `COGNITO_CLIENT_SECRET` and the
    /// optional `COGNITO_USER_POOL_ID` (required for signup auto-confirm).
    pub async fn from_env() -> Result<Self, AuthError> {
        let config = aws_config::load_from_env().await;
        let client_id = std::env::var("COGNITO_CLIENT_ID")
            .map_err(|_| AuthError::Provider("COGNITO_CLIENT_ID must be set".to_string()))?;
        let client_secret = std::env::var("COGNITO_CLIENT_SECRET")
            .map_err(|_| AuthError::Provider("COGNITO_CLIENT_SECRET must be set".to_string()))?;
        let user_pool_id = std::env::var("COGNITO_USER_POOL_ID").ok();
        Ok(Self::new(
            CognitoClient::new(&config),
            client_id,
            client_secret,
            user_pool_id,
        ))
    }

    async fn identity_from_token(&self, access_token: &str) -> Result<Identity, AuthError> {
        let user = self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
            .map_err(|e| map_cognito_error("get-user", format!("{:?}", e)))?;

        let mut identity = Identity::new(String::new(), None);
        for attribute in user.user_attributes() {
            match attribute.name() {
                "sub" => identity.user_id = attribute.value().unwrap_or_default().to_string(),
                "email" => identity.email = attribute.value().map(str::to_string),
                "name" => identity.display_name = attribute.value().map(str::to_string),
                _ => {}
            }
        }
        Ok(identity)
    }

    fn email_attribute(email: &str) -> Result<AttributeType, AuthError> {
        AttributeType::builder()
            .name("email")
            .value(email)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[async_trait]
impl IdentityStore for CognitoIdentityStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let secret_hash = compute_secret_hash(email, &self.client_id, &self.client_secret);

        let response = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .secret_hash(&secret_hash)
            .user_attributes(Self::email_attribute(email)?)
            .send()
            .await
            .map_err(|e| map_cognito_error("sign-up", format!("{:?}", e)))?;
        let user_sub = response.user_sub().to_string();
        tracing::info!("signup successful for {}", email);

        // Demo provisioning must yield a usable account right away; confirm
        // through the admin API when a pool id is configured.
        if let Some(user_pool_id) = &self.user_pool_id {
            if let Err(e) = self
                .client
                .admin_confirm_sign_up()
                .user_pool_id(user_pool_id)
                .username(email)
                .send()
                .await
            {
                tracing::error!("failed to auto-confirm {}: {:?}", email, e);
                // Account still exists; the user can confirm via email.
            }
        }

        // Hosted providers leave you signed in after signup.
        match self.sign_in(email, password).await {
            Ok(identity) => Ok(identity),
            Err(_) => Ok(Identity::new(user_sub, Some(email.to_string()))),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let secret_hash = compute_secret_hash(email, &self.client_id, &self.client_secret);

        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .auth_parameters("SECRET_HASH", &secret_hash)
            .send()
            .await
            .map_err(|e| map_cognito_error("sign-in", format!("{:?}", e)))?;

        let auth_result = response.authentication_result().ok_or_else(|| {
            AuthError::Provider("no authentication result returned".to_string())
        })?;
        let access_token = auth_result.access_token().unwrap_or_default().to_string();

        let identity = self.identity_from_token(&access_token).await?;
        *self.access_token.lock().unwrap() = Some(access_token);
        self.session.send_replace(Some(identity.clone()));
        tracing::info!("authentication successful for {}", email);
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        Err(AuthError::Provider(
            "federated sign-in requires the Cognito hosted UI flow".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let access_token = self.access_token.lock().unwrap().take();
        if let Some(access_token) = access_token {
            if let Err(e) = self
                .client
                .global_sign_out()
                .access_token(&access_token)
                .send()
                .await
            {
                // The local session is dropped regardless.
                tracing::error!("global sign-out failed: {:?}", e);
            }
        }
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
        let access_token = self
            .access_token
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AuthError::Provider("no active session".to_string()))?;

        let attribute = AttributeType::builder()
            .name("name")
            .value(name)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.client
            .update_user_attributes()
            .access_token(&access_token)
            .user_attributes(attribute)
            .send()
            .await
            .map_err(|e| map_cognito_error("update-attributes", format!("{:?}", e)))?;

        let identity = self.identity_from_token(&access_token).await?;
        if identity.user_id != user_id {
            return Err(AuthError::Provider(
                "display name updates apply to the signed-in user only".to_string(),
            ));
        }
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}
