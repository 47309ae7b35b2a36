//! Hugging Face Inference API client.
//!
//! Generation and conversational calls share `POST /models/{model}` and
//! differ only in the shape of `inputs`. Embeddings go through
//! `POST /pipeline/feature-extraction/{model}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{GenerationParams, InferenceBackend, InferenceError, Task};

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_EMBED_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Upstream error bodies are cut to this many characters.
const ERROR_BODY_CHARS: usize = 400;

#[derive(Serialize)]
struct WaitOptions {
    wait_for_model: bool,
}

const WAIT: WaitOptions = WaitOptions {
    wait_for_model: true,
};

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: WaitOptions,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    return_full_text: bool,
}

#[derive(Serialize)]
struct ConversationRequest<'a> {
    inputs: ConversationInputs<'a>,
    parameters: ConversationParameters,
    options: WaitOptions,
}

#[derive(Serialize)]
struct ConversationInputs<'a> {
    past_user_inputs: Vec<&'a str>,
    generated_responses: Vec<&'a str>,
    text: &'a str,
}

#[derive(Serialize)]
struct ConversationParameters {
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a str,
    options: WaitOptions,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

/// Client for the hosted inference API.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    embed_model: String,
}

impl HuggingFaceClient {
    pub fn new(
        client: Client,
        base_url: &str,
        token: Option<String>,
        embed_model: &str,
    ) -> Result<Self, InferenceError> {
        let base_url: Url = base_url
            .parse()
            .map_err(|e| InferenceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(InferenceError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            embed_model: embed_model.to_string(),
        })
    }

    /// `{base}/{prefix...}/{model}` with the model id as one encoded segment.
    fn endpoint(&self, prefix: &[&str], model: &str) -> Result<Url, InferenceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| InferenceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(prefix)
            .push(model);
        Ok(url)
    }

    /// POST a JSON body and return the raw response text on success.
    async fn post<B: Serialize + Sync>(
        &self,
        task: Task,
        model: &str,
        url: Url,
        body: &B,
    ) -> Result<String, InferenceError> {
        let token = self.token.as_deref().ok_or(InferenceError::MissingToken)?;

        debug!(%task, model, %url, "calling inference API");
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| InferenceError::Transport {
                task,
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let raw = resp.text().await.map_err(|e| InferenceError::Transport {
            task,
            model: model.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(InferenceError::Api {
                task,
                model: model.to_string(),
                status: status.as_u16(),
                body: raw.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(raw)
    }
}

/// Pull `generated_text` out of either `[{..}]` or `{..}`.
fn extract_generated_text(value: &Value) -> String {
    let item = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    item.and_then(|v| v.get("generated_text"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

#[async_trait]
impl InferenceBackend for HuggingFaceClient {
    async fn text_generation(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let url = self.endpoint(&["models"], model)?;
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                return_full_text: false,
            },
            options: WAIT,
        };
        let raw = self.post(Task::Generation, model, url, &body).await?;
        // Some deployments answer with bare text; that carries no
        // generated_text and counts as empty output.
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        Ok(extract_generated_text(&value))
    }

    async fn conversational(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let url = self.endpoint(&["models"], model)?;
        let body = ConversationRequest {
            inputs: ConversationInputs {
                past_user_inputs: Vec::new(),
                generated_responses: Vec::new(),
                text: prompt,
            },
            parameters: ConversationParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
            },
            options: WAIT,
        };
        let raw = self.post(Task::Conversational, model, url, &body).await?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|e| InferenceError::Decode {
                task: Task::Conversational,
                model: model.to_string(),
                message: e.to_string(),
            })?;
        Ok(extract_generated_text(&value))
    }

    async fn feature_extraction(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let model = self.embed_model.as_str();
        let url = self.endpoint(&["pipeline", "feature-extraction"], model)?;
        let body = EmbeddingRequest {
            inputs: text,
            options: WAIT,
        };
        let raw = self.post(Task::Embedding, model, url, &body).await?;
        let decode_err = |message: String| InferenceError::Decode {
            task: Task::Embedding,
            model: model.to_string(),
            message,
        };
        let vector = match serde_json::from_str::<EmbeddingResponse>(&raw)
            .map_err(|e| decode_err(e.to_string()))?
        {
            EmbeddingResponse::Flat(v) => v,
            EmbeddingResponse::Nested(rows) => rows.into_iter().next().unwrap_or_default(),
        };
        if vector.is_empty() {
            return Err(decode_err("empty embedding".into()));
        }
        Ok(vector)
    }
}
