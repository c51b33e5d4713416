use thiserror::Error;

use crate::roles::Role;

/// Identity provider failures, surfaced with the provider's code intact.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no account found for this email")]
    NotFound,
    #[error("incorrect email or password")]
    InvalidCredential,
    #[error("an account with this email already exists")]
    AlreadyInUse,
    #[error("password does not meet the minimum requirements")]
    WeakCredential,
    #[error("malformed email address")]
    MalformedIdentifier,
    #[error("too many attempts, try again later")]
    RateLimited,
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Document store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("permission denied by the store")]
    PermissionDenied,
    #[error("stored document is malformed: {0}")]
    Malformed(String),
}

/// Raised by caller-facing layers before any store call is attempted;
/// never produced by the stores themselves.
#[derive(Debug, Error)]
#[error("{required} role required, current role is {current}")]
pub struct AuthorizationError {
    pub required: Role,
    pub current: Role,
}
