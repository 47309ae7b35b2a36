//! Request and response bodies. JSON field names are camelCase.

use chrono::{DateTime, Utc};
use quill_core::channels::{Channel, ChannelValues, loose_flag, loose_text};
use quill_core::chats::{ChatRow, MessageRow, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body for all failed requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub hint: &'static str,
}

impl From<Channel> for ChannelInfo {
    fn from(c: Channel) -> Self {
        Self {
            key: c.key(),
            label: c.label(),
            hint: c.hint(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatRow> for ChatResponse {
    fn from(row: ChatRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatResponse {
    pub chat_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenameChatRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageResponse {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            chat_id: row.chat_id,
            role: row.role(),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppendMessageRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub channel: Option<String>,
    #[serde(default)]
    pub values: ChannelValues,
    /// Deep research may be sent alongside the values instead of inside them.
    #[serde(default, deserialize_with = "loose_flag")]
    pub deep_research: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
    pub title: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct EditParagraphResponse {
    pub rewritten: String,
}
