//! API server configuration.

use quill_core::inference::DEFAULT_MODELS;
use quill_core::inference::huggingface::{DEFAULT_API_BASE, DEFAULT_EMBED_MODEL};

/// How bearer tokens are validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthConfig {
    /// Verify HS256 tokens locally with the identity provider's JWT secret.
    Jwt { secret: String },
    /// Ask the identity provider's user endpoint.
    Remote { url: String, service_key: String },
    /// No provider configured; every protected request is rejected.
    Unconfigured,
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    pub auth: AuthConfig,
    /// Inference API token; generation fails fast without it.
    pub hf_token: Option<String>,
    /// Inference API base URL.
    pub hf_api_base: String,
    /// Generation models, tried in order.
    pub models: Vec<String>,
    /// Model used to embed retrieval queries.
    pub embed_model: String,
    /// Ground prompts with the `documents` table.
    pub retrieval_enabled: bool,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Comma-separated model list; blank entries are ignored.
pub fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AuthConfig {
    /// A JWT secret wins over a remote provider.
    pub fn resolve(
        jwt_secret: Option<String>,
        url: Option<String>,
        service_key: Option<String>,
    ) -> Self {
        match (jwt_secret, url, service_key) {
            (Some(secret), _, _) => AuthConfig::Jwt { secret },
            (None, Some(url), Some(service_key)) => AuthConfig::Remote { url, service_key },
            _ => AuthConfig::Unconfigured,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable            | Default                                   |
    /// |---------------------|-------------------------------------------|
    /// | `BIND_ADDR`         | `127.0.0.1:3100`                          |
    /// | `DATABASE_URL`      | `postgres://localhost:5432/quill`         |
    /// | `AUTH_JWT_SECRET`   | unset (use remote validation)             |
    /// | `AUTH_URL`          | unset                                     |
    /// | `AUTH_SERVICE_KEY`  | unset                                     |
    /// | `HF_TOKEN`          | unset                                     |
    /// | `HF_API_BASE`       | `https://api-inference.huggingface.co`    |
    /// | `HF_MODELS`         | the three default instruct models         |
    /// | `EMBED_MODEL`       | `sentence-transformers/all-MiniLM-L6-v2`  |
    /// | `RETRIEVAL_ENABLED` | `false`                                   |
    pub fn from_env() -> Self {
        let models = non_empty_var("HF_MODELS")
            .map(|raw| parse_models(&raw))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        Self {
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3100".into()),
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/quill".into()),
            auth: AuthConfig::resolve(
                non_empty_var("AUTH_JWT_SECRET"),
                non_empty_var("AUTH_URL"),
                non_empty_var("AUTH_SERVICE_KEY"),
            ),
            hf_token: non_empty_var("HF_TOKEN"),
            hf_api_base: non_empty_var("HF_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            models,
            embed_model: non_empty_var("EMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.into()),
            retrieval_enabled: non_empty_var("RETRIEVAL_ENABLED")
                .is_some_and(|v| parse_flag(&v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_ignores_blanks() {
        assert_eq!(parse_models(" a/b , ,c "), vec!["a/b", "c"]);
        assert!(parse_models(" , ").is_empty());
    }

    #[test]
    fn flags() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn jwt_secret_wins() {
        assert_eq!(
            AuthConfig::resolve(Some("s".into()), Some("u".into()), Some("k".into())),
            AuthConfig::Jwt { secret: "s".into() }
        );
        assert_eq!(
            AuthConfig::resolve(None, Some("u".into()), Some("k".into())),
            AuthConfig::Remote {
                url: "u".into(),
                service_key: "k".into()
            }
        );
        assert_eq!(
            AuthConfig::resolve(None, Some("u".into()), None),
            AuthConfig::Unconfigured
        );
    }
}
