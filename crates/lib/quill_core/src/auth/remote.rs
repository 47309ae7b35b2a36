//! Token validation against the identity provider's user endpoint.
//!
//! `GET {base}/auth/v1/user` with the caller's token as bearer and the
//! service key as `apikey`. A 2xx response carries the user record.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{AuthError, IdentityProvider};

#[derive(Deserialize)]
struct UserRecord {
    id: String,
}

/// Asks a hosted identity provider who a token belongs to.
#[derive(Clone)]
pub struct RemoteIdentity {
    client: Client,
    user_url: Url,
    service_key: String,
}

impl RemoteIdentity {
    pub fn new(client: Client, base_url: &str, service_key: &str) -> Result<Self, AuthError> {
        let mut user_url: Url = base_url
            .parse()
            .map_err(|e| AuthError::Config(format!("invalid identity provider URL: {e}")))?;
        // Appended below any path prefix in the base.
        user_url
            .path_segments_mut()
            .map_err(|_| {
                AuthError::Config(format!("invalid identity provider URL: {base_url}"))
            })?
            .pop_if_empty()
            .extend(["auth", "v1", "user"]);
        Ok(Self {
            client,
            user_url,
            service_key: service_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn user_id(&self, token: &str) -> Result<String, AuthError> {
        let resp = self
            .client
            .get(self.user_url.clone())
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), "identity provider rejected token");
            return Err(AuthError::InvalidToken);
        }

        let user: UserRecord = resp.json().await.map_err(|_| AuthError::InvalidToken)?;
        if user.id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(user.id)
    }
}
