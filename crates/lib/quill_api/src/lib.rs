//! # quill_api
//!
//! HTTP API library for Quill.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use quill_core::auth::jwt::JwtIdentity;
use quill_core::auth::remote::RemoteIdentity;
use quill_core::auth::{AuthError, IdentityProvider, NoIdentity};
use quill_core::inference::huggingface::HuggingFaceClient;
use quill_core::inference::{InferenceBackend, InferenceError};
use quill_core::retrieval::{KnowledgeStore, PgKnowledgeStore};
use sqlx::PgPool;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{ApiConfig, AuthConfig};
use crate::handlers::{channels, chats, edits, generate, health, messages};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Resolves bearer tokens to user ids.
    pub identity: Arc<dyn IdentityProvider>,
    /// Generation and embedding calls.
    pub inference: Arc<dyn InferenceBackend>,
    /// Grounding source; `None` disables retrieval.
    pub knowledge: Option<Arc<dyn KnowledgeStore>>,
}

/// Errors raised while assembling [`AppState`].
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("identity provider: {0}")]
    Auth(#[from] AuthError),

    #[error("inference client: {0}")]
    Inference(#[from] InferenceError),
}

impl AppState {
    /// Wire the production collaborators described by `config`.
    pub fn from_config(pool: PgPool, config: ApiConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::new();

        let identity: Arc<dyn IdentityProvider> = match &config.auth {
            AuthConfig::Jwt { secret } => Arc::new(JwtIdentity::new(secret.as_bytes())),
            AuthConfig::Remote { url, service_key } => {
                Arc::new(RemoteIdentity::new(http.clone(), url, service_key)?)
            }
            AuthConfig::Unconfigured => {
                warn!("no identity provider configured; chat routes will reject every request");
                Arc::new(NoIdentity)
            }
        };

        if config.hf_token.is_none() {
            warn!("HF_TOKEN is not set; generation requests will fail");
        }
        let inference: Arc<dyn InferenceBackend> = Arc::new(HuggingFaceClient::new(
            http,
            &config.hf_api_base,
            config.hf_token.clone(),
            &config.embed_model,
        )?);

        let knowledge = config
            .retrieval_enabled
            .then(|| Arc::new(PgKnowledgeStore::new(pool.clone())) as Arc<dyn KnowledgeStore>);

        Ok(Self {
            pool,
            config,
            identity,
            inference,
            knowledge,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `quill_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    quill_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::GET_API_CHANNELS, get(channels::list_channels_handler))
        .route(routes::POST_API_GENERATE, post(generate::generate_handler))
        .route(
            routes::POST_API_EDITS_PARAGRAPH,
            post(edits::edit_paragraph_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            routes::API_CHATS,
            get(chats::list_chats_handler).post(chats::create_chat_handler),
        )
        .route(
            routes::API_CHATS_ID,
            patch(chats::rename_chat_handler).delete(chats::delete_chat_handler),
        )
        .route(
            routes::API_CHATS_ID_MESSAGES,
            get(messages::list_messages_handler).post(messages::append_message_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
