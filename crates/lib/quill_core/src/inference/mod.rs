//! Text generation against a hosted inference API.
//!
//! # Public API
//!
//! - [`InferenceBackend`]: the three calls Quill makes (generation,
//!   conversational generation, embedding)
//! - [`generate_with_fallback`]: walk a model list until one answers
//! - [`huggingface::HuggingFaceClient`]: the HTTP implementation
//!
//! Hosted models are deployed for a single task. Asking a chat-only model
//! for plain text generation fails with a "not supported for task" error,
//! so the fallback loop retries such models with the conversational
//! payload before moving on.

pub mod huggingface;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// Models tried in order; the first that answers wins.
pub const DEFAULT_MODELS: [&str; 3] = [
    "mistralai/Mistral-7B-Instruct-v0.3",
    "HuggingFaceH4/zephyr-7b-beta",
    "Qwen/Qwen2.5-7B-Instruct",
];

/// Which inference call produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Generation,
    Conversational,
    Embedding,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Task::Generation => "HF",
            Task::Conversational => "HF(chat)",
            Task::Embedding => "HF embed",
        })
    }
}

/// Errors from the inference API.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HF_TOKEN is not configured")]
    MissingToken,

    #[error("{task} {model} {status}: {body}")]
    Api {
        task: Task,
        model: String,
        status: u16,
        body: String,
    },

    #[error("{task} {model} request failed: {message}")]
    Transport {
        task: Task,
        model: String,
        message: String,
    },

    #[error("{task} {model} response unreadable: {message}")]
    Decode {
        task: Task,
        model: String,
        message: String,
    },

    #[error("No generation models configured")]
    NoModels,

    #[error("Invalid inference base URL: {0}")]
    InvalidUrl(String),
}

impl InferenceError {
    /// Whether the model rejected the request shape rather than failing.
    pub fn is_task_mismatch(&self) -> bool {
        let msg = self.to_string().to_ascii_lowercase();
        ["not supported for task", "task not supported", "unsupported"]
            .iter()
            .any(|needle| msg.contains(needle))
    }
}

/// Sampling parameters for a generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
}

impl GenerationParams {
    /// Long-form drafts.
    pub const DRAFT: Self = Self {
        max_new_tokens: 900,
        temperature: 0.7,
        top_p: Some(0.95),
    };

    /// Single-paragraph rewrites.
    pub const REWRITE: Self = Self {
        max_new_tokens: 300,
        temperature: 0.5,
        top_p: None,
    };
}

/// The inference calls Quill depends on.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Plain text generation; returns the trimmed continuation.
    async fn text_generation(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;

    /// Single-turn conversational generation; returns the trimmed reply.
    async fn conversational(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;

    /// Embed one text with the configured embedding model.
    async fn feature_extraction(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// Successful generation and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

/// Try each model in order: text generation first, then the conversational
/// shape when the model reports a task mismatch. Returns the first success,
/// or the last error once every model has failed.
pub async fn generate_with_fallback<S: AsRef<str>>(
    backend: &dyn InferenceBackend,
    models: &[S],
    prompt: &str,
    params: &GenerationParams,
) -> Result<Generation, InferenceError> {
    let mut last_err = None;

    for model in models {
        let model: &str = model.as_ref();
        let err = match backend.text_generation(model, prompt, params).await {
            Ok(text) => return Ok(succeeded(model, text)),
            Err(InferenceError::MissingToken) => return Err(InferenceError::MissingToken),
            Err(e) => e,
        };

        if err.is_task_mismatch() {
            warn!(model, error = %err, "task mismatch, retrying as conversational");
            match backend.conversational(model, prompt, params).await {
                Ok(text) => return Ok(succeeded(model, text)),
                Err(e) => {
                    warn!(model, error = %e, "conversational fallback failed");
                    last_err = Some(e);
                }
            }
        } else {
            warn!(model, error = %err, "generation failed, trying next model");
            last_err = Some(err);
        }
    }

    Err(last_err.unwrap_or(InferenceError::NoModels))
}

fn succeeded(model: &str, text: String) -> Generation {
    info!(model, chars = text.chars().count(), "generation succeeded");
    Generation {
        text,
        model: model.to_string(),
    }
}
