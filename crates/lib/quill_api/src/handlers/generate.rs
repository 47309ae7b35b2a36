//! Content generation for a channel brief.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use tracing::info;

use quill_core::channels::Channel;
use quill_core::inference::{GenerationParams, generate_with_fallback};
use quill_core::prompt;
use quill_core::retrieval::gather_knowledge;

use super::json_body;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{GenerateRequest, GenerateResponse};

/// `POST /api/generate`: draft content for one channel brief, grounded in
/// stored knowledge when retrieval is enabled.
pub async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<GenerateResponse>> {
    let req: GenerateRequest = json_body(&body)?;
    let channel = req
        .channel
        .as_deref()
        .and_then(Channel::from_key)
        .ok_or_else(|| AppError::Validation("Unsupported channel".into()))?;
    let deep_research = req.values.deep_research || req.deep_research;

    let knowledge = match (&state.knowledge, req.values.research_query()) {
        (Some(store), Some(query)) => {
            gather_knowledge(store.as_ref(), state.inference.as_ref(), query, deep_research).await
        }
        _ => None,
    };

    let prompt =
        prompt::research_prompt(channel, &req.values, knowledge.as_deref(), deep_research);
    info!(
        channel = channel.key(),
        deep_research,
        grounded = knowledge.is_some(),
        "generating content"
    );

    let generation = generate_with_fallback(
        state.inference.as_ref(),
        &state.config.models,
        &prompt,
        &GenerationParams::DRAFT,
    )
    .await?;

    Ok(Json(GenerateResponse {
        content: generation.text,
        title: channel.build_title(&req.values),
        model: generation.model,
    }))
}
