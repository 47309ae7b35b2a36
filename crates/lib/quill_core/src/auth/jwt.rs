//! Local JWT verification.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::{AuthError, IdentityProvider};

/// Claims Quill reads from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the user id.
    pub sub: String,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Verifies HS256 access tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtIdentity {
    key: DecodingKey,
}

impl JwtIdentity {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
        }
    }

    /// Verify a token, returning the claims on success.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Hosted identity providers stamp their own audience; it carries no
        // meaning here.
        validation.validate_aud = false;
        decode::<TokenClaims>(token, &self.key, &validation)
            .ok()
            .map(|data| data.claims)
            .filter(|claims| !claims.sub.is_empty())
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentity {
    async fn user_id(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token)
            .map(|claims| claims.sub)
            .ok_or(AuthError::InvalidToken)
    }
}
