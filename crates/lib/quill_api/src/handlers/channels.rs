//! Channel registry endpoint.

use axum::Json;
use quill_core::channels::Channel;

use crate::models::{ChannelInfo, ChannelListResponse};

/// `GET /api/channels`: every channel the generator supports.
pub async fn list_channels_handler() -> Json<ChannelListResponse> {
    Json(ChannelListResponse {
        channels: Channel::ALL.into_iter().map(ChannelInfo::from).collect(),
    })
}
