//! Request handlers.

pub mod channels;
pub mod chats;
pub mod edits;
pub mod generate;
pub mod health;
pub mod messages;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Parse a JSON request body; an empty body reads as `{}`.
pub(crate) fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

pub(crate) fn parse_chat_id(raw: &str) -> AppResult<Uuid> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid chat id".into()))
}
