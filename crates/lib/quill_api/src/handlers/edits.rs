//! Paragraph rewrite endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use quill_core::inference::{GenerationParams, generate_with_fallback};
use quill_core::prompt::{self, ParagraphEdit};

use super::json_body;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::EditParagraphResponse;

/// `POST /api/edits/paragraph`: rewrite one paragraph per an instruction.
pub async fn edit_paragraph_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<EditParagraphResponse>> {
    let edit: ParagraphEdit = json_body(&body)?;
    let (Some(selected), Some(instruction)) =
        (edit.selected.as_deref(), edit.instruction.as_deref())
    else {
        return Err(AppError::Validation("Missing selected/instruction".into()));
    };

    let prompt = prompt::rewrite_prompt(&edit, selected, instruction);
    let generation = generate_with_fallback(
        state.inference.as_ref(),
        &state.config.models,
        &prompt,
        &GenerationParams::REWRITE,
    )
    .await?;

    Ok(Json(EditParagraphResponse {
        rewritten: prompt::clean_rewrite(&generation.text, selected),
    }))
}
