//! Chat request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use quill_core::chats;

use super::{json_body, parse_chat_id};
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ChatListResponse, ChatResponse, CreateChatRequest, CreateChatResponse, RenameChatRequest,
};

/// `GET /api/chats`: the caller's chats, most recently updated first.
pub async fn list_chats_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<ChatListResponse>> {
    let rows = chats::list_chats(&state.pool, &user.0).await?;
    Ok(Json(ChatListResponse {
        chats: rows.into_iter().map(ChatResponse::from).collect(),
    }))
}

/// `POST /api/chats`: create a chat.
pub async fn create_chat_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    body: Bytes,
) -> AppResult<Json<CreateChatResponse>> {
    let req: CreateChatRequest = json_body(&body)?;
    let chat = chats::create_chat(&state.pool, &user.0, req.title.as_deref()).await?;
    info!(chat_id = %chat.id, user_id = %user.0, "chat created");
    Ok(Json(CreateChatResponse { chat_id: chat.id }))
}

/// `PATCH /api/chats/{id}`: rename a chat.
pub async fn rename_chat_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<ChatResponse>> {
    let chat_id = parse_chat_id(&id)?;
    let req: RenameChatRequest = json_body(&body)?;
    let chat = chats::rename_chat(&state.pool, &user.0, &chat_id, req.title.as_deref()).await?;
    Ok(Json(chat.into()))
}

/// `DELETE /api/chats/{id}`: delete a chat and its messages.
pub async fn delete_chat_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let chat_id = parse_chat_id(&id)?;
    chats::delete_chat(&state.pool, &user.0, &chat_id).await?;
    info!(chat_id = %chat_id, user_id = %user.0, "chat deleted");
    Ok(StatusCode::NO_CONTENT)
}
