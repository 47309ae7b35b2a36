//! Session boundary: turns a bearer token into a user id.
//!
//! Two identity providers are available. [`jwt::JwtIdentity`] verifies
//! HS256 tokens locally with the provider's shared secret;
//! [`remote::RemoteIdentity`] asks the provider's user endpoint.

pub mod jwt;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Identity provider misconfigured: {0}")]
    Config(String),
}

/// Resolves an access token to the id of the user it belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_id(&self, token: &str) -> Result<String, AuthError>;
}

/// Stand-in used when no identity provider is configured: rejects all
/// tokens with a configuration error.
pub struct NoIdentity;

#[async_trait]
impl IdentityProvider for NoIdentity {
    async fn user_id(&self, _token: &str) -> Result<String, AuthError> {
        Err(AuthError::Config("no identity provider configured".into()))
    }
}
