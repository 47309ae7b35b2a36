//! Message request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use quill_core::chats::{self, Role};

use super::{json_body, parse_chat_id};
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AppendMessageRequest, MessageListResponse, MessageResponse, OkResponse};

/// `GET /api/chats/{id}/messages`: messages of one chat, oldest first.
pub async fn list_messages_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageListResponse>> {
    let chat_id = parse_chat_id(&id)?;
    let rows = chats::list_messages(&state.pool, &user.0, &chat_id).await?;
    Ok(Json(MessageListResponse {
        messages: rows.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// `POST /api/chats/{id}/messages`: append a message to a chat.
pub async fn append_message_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<OkResponse>> {
    let chat_id = parse_chat_id(&id)?;
    let req: AppendMessageRequest = json_body(&body)?;
    let content = req
        .content
        .ok_or_else(|| AppError::Validation("Missing content".into()))?;
    let role = Role::parse_lenient(req.role.as_deref());

    chats::append_message(&state.pool, &user.0, &chat_id, role, &content).await?;
    Ok(Json(OkResponse { ok: true }))
}
