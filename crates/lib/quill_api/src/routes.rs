//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const GET_API_CHANNELS: &str = "/api/channels";
pub const POST_API_GENERATE: &str = "/api/generate";
pub const POST_API_EDITS_PARAGRAPH: &str = "/api/edits/paragraph";
pub const API_CHATS: &str = "/api/chats";
pub const API_CHATS_ID: &str = "/api/chats/{id}";
pub const API_CHATS_ID_MESSAGES: &str = "/api/chats/{id}/messages";
